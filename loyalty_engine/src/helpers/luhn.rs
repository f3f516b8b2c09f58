//! Luhn checksum validation for order numbers.

/// Checks whether `number` is a well-formed order number: non-empty, decimal digits only, and passing the Luhn
/// checksum. Any non-digit character short-circuits to `false`.
///
/// Digits are processed left to right; the digit at position `i` is doubled when `i % 2 == len % 2`, with 9
/// subtracted from any doubled value exceeding 9. The number is accepted iff the digit sum is divisible by 10.
pub fn is_valid(number: &str) -> bool {
    let mut digits = Vec::with_capacity(number.len());
    for c in number.chars() {
        match c.to_digit(10) {
            Some(d) => digits.push(d),
            None => return false,
        }
    }
    if digits.is_empty() {
        return false;
    }

    let parity = digits.len() % 2;
    let sum: u32 = digits
        .iter()
        .enumerate()
        .map(|(i, &d)| {
            if i % 2 == parity {
                let doubled = d * 2;
                if doubled > 9 {
                    doubled - 9
                } else {
                    doubled
                }
            } else {
                d
            }
        })
        .sum();
    sum % 10 == 0
}
