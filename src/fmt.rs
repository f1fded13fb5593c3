/// Format a float as a euro amount with German separators: 1.234,56 €
pub fn money(val: f64) -> String {
    let negative = val < 0.0;
    let abs = val.abs();
    let cents = format!("{:.2}", abs);
    let parts: Vec<&str> = cents.split('.').collect();
    let int_part = parts[0];
    let dec_part = parts[1];

    let mut grouped = String::new();
    for (i, c) in int_part.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }
    let grouped: String = grouped.chars().rev().collect();

    if negative {
        format!("-{grouped},{dec_part} \u{20ac}")
    } else {
        format!("{grouped},{dec_part} \u{20ac}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_formatting() {
        assert_eq!(money(1234.56), "1.234,56 \u{20ac}");
        assert_eq!(money(-500.00), "-500,00 \u{20ac}");
        assert_eq!(money(0.0), "0,00 \u{20ac}");
        assert_eq!(money(1000000.99), "1.000.000,99 \u{20ac}");
        assert_eq!(money(42.10), "42,10 \u{20ac}");
    }
}
