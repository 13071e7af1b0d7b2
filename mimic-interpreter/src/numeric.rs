use num_bigint::BigInt;
use num_traits::{One, Signed, ToPrimitive, Zero};

/// Failures of the arithmetic backend, mapped to conditions by the number
/// natives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericError {
    DivisionByZero,
    NotParseable,
    ExponentTooLarge,
}

pub fn div(lhs: &BigInt, rhs: &BigInt) -> Result<BigInt, NumericError> {
    if rhs.is_zero() {
        return Err(NumericError::DivisionByZero);
    }
    Ok(lhs / rhs)
}

pub fn rem(lhs: &BigInt, rhs: &BigInt) -> Result<BigInt, NumericError> {
    if rhs.is_zero() {
        return Err(NumericError::DivisionByZero);
    }
    Ok(lhs % rhs)
}

/// Integer exponentiation. Negative exponents truncate toward zero, the way
/// the rest of the integer arithmetic does.
pub fn pow(base: &BigInt, exp: &BigInt) -> Result<BigInt, NumericError> {
    if exp.is_negative() {
        if base.is_zero() {
            return Err(NumericError::DivisionByZero);
        }
        if base.magnitude().is_one() {
            let even = (exp % 2u8).is_zero();
            return Ok(if even { BigInt::one() } else { base.clone() });
        }
        return Ok(BigInt::zero());
    }
    let exp = exp.to_u32().ok_or(NumericError::ExponentTooLarge)?;
    Ok(base.pow(exp))
}

/// Parse a full text as an integer.
pub fn parse(text: &str) -> Result<BigInt, NumericError> {
    text.trim()
        .parse::<BigInt>()
        .map_err(|_| NumericError::NotParseable)
}

/// Parse the longest numeric prefix of a text, used by the `takeLongest`
/// recovery strategy.
pub fn parse_longest(text: &str) -> Result<BigInt, NumericError> {
    let trimmed = text.trim_start();
    let mut end = 0;
    let bytes = trimmed.as_bytes();
    if end < bytes.len() && (bytes[end] == b'-' || bytes[end] == b'+') {
        end += 1;
    }
    let digits_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    if end == digits_start {
        return Err(NumericError::NotParseable);
    }
    trimmed[..end]
        .parse::<BigInt>()
        .map_err(|_| NumericError::NotParseable)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn division_by_zero_is_reported() {
        assert_eq!(
            div(&BigInt::from(10), &BigInt::from(0)),
            Err(NumericError::DivisionByZero)
        );
    }

    #[test]
    fn truncated_division() {
        assert_eq!(div(&BigInt::from(-7), &BigInt::from(2)), Ok(BigInt::from(-3)));
        assert_eq!(rem(&BigInt::from(-7), &BigInt::from(2)), Ok(BigInt::from(-1)));
    }

    #[test]
    fn negative_exponents_truncate() {
        assert_eq!(pow(&BigInt::from(2), &BigInt::from(-1)), Ok(BigInt::from(0)));
        assert_eq!(pow(&BigInt::from(-1), &BigInt::from(-3)), Ok(BigInt::from(-1)));
        assert_eq!(
            pow(&BigInt::from(0), &BigInt::from(-1)),
            Err(NumericError::DivisionByZero)
        );
    }

    #[test]
    fn longest_prefix_parse() {
        assert_eq!(parse_longest("42abc"), Ok(BigInt::from(42)));
        assert_eq!(parse_longest("-13 tail"), Ok(BigInt::from(-13)));
        assert_eq!(parse_longest("abc"), Err(NumericError::NotParseable));
    }
}
