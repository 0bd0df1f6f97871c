use rust_decimal::Decimal;

/// Format an amount the Indonesian way for terminal display, `.` thousands
/// and `,` decimal: 1234567.89 becomes 1.234.567,89.
pub fn money(val: &Decimal) -> String {
    let negative = val.is_sign_negative() && !val.is_zero();
    let cents = format!("{:.2}", val.abs());
    let parts: Vec<&str> = cents.split('.').collect();
    let int_part = parts[0];
    let dec_part = parts[1];

    let mut with_dots = String::new();
    for (i, c) in int_part.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            with_dots.push('.');
        }
        with_dots.push(c);
    }
    let with_dots: String = with_dots.chars().rev().collect();

    if negative {
        format!("-{with_dots},{dec_part}")
    } else {
        format!("{with_dots},{dec_part}")
    }
}
