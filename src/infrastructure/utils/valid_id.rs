use crate::errors::AppError;

pub const MAX_ID: i32 = 999_999;

/// Rejects ids outside the range the API hands out
pub fn valid_id(id: i32) -> Result<i32, AppError> {
    if (1..=MAX_ID).contains(&id) {
        Ok(id)
    } else {
        Err(AppError::InvalidInput("Invalid ID".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_ids_in_range() {
        assert_eq!(valid_id(1).unwrap(), 1);
        assert_eq!(valid_id(MAX_ID).unwrap(), MAX_ID);
    }

    #[test]
    fn rejects_out_of_range_ids() {
        assert!(valid_id(0).is_err());
        assert!(valid_id(-4).is_err());
        assert!(valid_id(MAX_ID + 1).is_err());
    }
}
