//! Assertion helpers for the OtpKit authorizer.
//!
//! Every `check_*` function takes the error to return on failure, so call
//! sites read as a flat list of preconditions.

#[inline(always)]
pub fn bytes_eq(left: &[u8], right: &[u8], len: usize) -> bool {
    left.len() == len && right == left
}

macro_rules! otp_assert {
  ($func_name:ident, $($param:ident: $type:ty),* $(,)? | $check:expr) => {
      #[inline(always)]
      pub fn $func_name<E>($($param: $type,)* error: E) -> Result<(), E> {
          if $check {
              Ok(())
          } else {
              Err(error)
          }
      }
  };
}

macro_rules! otp_assert_return {
  ($func_name:ident, $return_type:ty, $($param:ident: $type:ty),* $(,)? | $check:expr) => {
      #[inline(always)]
      pub fn $func_name<E>($($param: $type,)* error: E) -> Result<$return_type, E> {
          match $check {
              Some(value) => Ok(value),
              None => Err(error),
          }
      }
  };
}

otp_assert!(check_bytes_match, left: &[u8], right: &[u8], len: usize |
  bytes_eq(left, right, len)
);

otp_assert!(check_bytes_differ, left: &[u8], right: &[u8] |
  left != right
);

otp_assert!(check_nonzero, bytes: &[u8] |
  bytes.iter().any(|b| *b != 0)
);

otp_assert!(check_len, actual: usize, expected: usize |
  actual == expected
);

otp_assert!(check_below, value: u64, bound: u64 |
  value < bound
);

otp_assert!(check_not_before, value: u64, floor: u64 |
  value >= floor
);

otp_assert!(check_in_window, value: u64, start: u64, end: u64 |
  start <= value && value < end
);

otp_assert!(check_sufficient, available: u128, amount: u128 |
  available >= amount
);

otp_assert_return!(check_add, u64, left: u64, right: u64 |
  left.checked_add(right)
);

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Failed;

    #[test]
    fn byte_checks() {
        assert_eq!(check_bytes_match(&[1, 2], &[1, 2], 2, Failed), Ok(()));
        assert_eq!(check_bytes_match(&[1, 2], &[1, 3], 2, Failed), Err(Failed));
        assert_eq!(check_bytes_match(&[1, 2], &[1, 2], 3, Failed), Err(Failed));
        assert_eq!(check_bytes_differ(&[1], &[2], Failed), Ok(()));
        assert_eq!(check_nonzero(&[0, 0, 1], Failed), Ok(()));
        assert_eq!(check_nonzero(&[0, 0], Failed), Err(Failed));
    }

    #[test]
    fn window_is_half_open() {
        assert_eq!(check_in_window(10, 10, 20, Failed), Ok(()));
        assert_eq!(check_in_window(19, 10, 20, Failed), Ok(()));
        assert_eq!(check_in_window(20, 10, 20, Failed), Err(Failed));
        assert_eq!(check_in_window(9, 10, 20, Failed), Err(Failed));
    }

    #[test]
    fn add_reports_overflow() {
        assert_eq!(check_add(u64::MAX, 1, Failed), Err(Failed));
    }
}
