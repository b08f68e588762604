use chrono::NaiveDate;
use validator::Validate;
use crate::core::health::Gender;
use crate::errors::AppError;
use crate::models::meal::MealType;
use crate::models::meal_plan::MealSlot;

pub fn validate_payload<T: Validate>(payload: &T) -> Result<(), AppError> {
    payload.validate()
        .map_err(|err| AppError::BadRequest(err.to_string()))
}

pub fn validate_meal_type(meal_type: &str) -> Result<MealType, AppError> {
    meal_type.parse().map_err(|_| {
        AppError::BadRequest("Meal type must be one of breakfast, lunch, dinner or snack".to_string())
    })
}

pub fn validate_meal_slot(slot: &str) -> Result<MealSlot, AppError> {
    slot.parse().map_err(|_| {
        AppError::BadRequest("Meal slot must be one of breakfast, snack1, lunch, snack2 or dinner".to_string())
    })
}

pub fn validate_gender(gender: &str) -> Result<Gender, AppError> {
    gender.parse()
        .map_err(|_| AppError::BadRequest("Gender must be either male or female".to_string()))
}

/// Parses an optional `YYYY-MM-DD` query value, falling back to `default`.
pub fn parse_date_or(date: Option<&str>, default: NaiveDate) -> Result<NaiveDate, AppError> {
    match date {
        None => Ok(default),
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map_err(|_| AppError::BadRequest("Invalid date format, expected YYYY-MM-DD".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_are_checked_at_the_boundary() {
        assert_eq!(validate_meal_type("dinner").unwrap(), MealType::Dinner);
        assert!(matches!(validate_meal_type("supper"), Err(AppError::BadRequest(_))));
        assert_eq!(validate_meal_slot("snack2").unwrap(), MealSlot::Snack2);
        assert!(validate_meal_slot("snack3").is_err());
        assert_eq!(validate_gender("femme").unwrap(), Gender::Female);
    }

    #[test]
    fn dates_default_when_absent() {
        let default = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert_eq!(parse_date_or(None, default).unwrap(), default);
        assert_eq!(
            parse_date_or(Some("2024-02-29"), default).unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        );
        assert!(parse_date_or(Some("29/02/2024"), default).is_err());
    }
}
