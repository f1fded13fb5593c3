/// Canonicalize a driver name for comparison.
///
/// Lower-cases, collapses runs of whitespace/hyphens/underscores (and
/// stray commas/periods from "Last, First" spellings) to a single space,
/// and rewrites the dialectal prefix token "al" to "el" so differently
/// transliterated variants of the same name compare equal.
pub fn normalize(name: &str) -> String {
    let lowered = name.to_lowercase();
    let spaced: String = lowered
        .chars()
        .map(|c| {
            if c.is_whitespace() || matches!(c, '-' | '_' | ',' | '.') {
                ' '
            } else {
                c
            }
        })
        .collect();
    spaced
        .split_whitespace()
        .map(|tok| if tok == "al" { "el" } else { tok })
        .collect::<Vec<_>>()
        .join(" ")
}
