use chrono::NaiveDate;
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use uuid::Uuid;
use crate::models::meal::LoggedMeal;

pub const CSV_HEADER: [&str; 9] = [
    "date",
    "meal_type",
    "food",
    "quantity_g",
    "calories",
    "protein",
    "carbohydrate",
    "fat",
    "fiber",
];

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// One CSV line. Field order follows `CSV_HEADER`.
#[derive(Serialize)]
struct MealRow<'a> {
    date: String,
    meal_type: &'static str,
    food: &'a str,
    quantity_g: String,
    calories: String,
    protein: String,
    carbohydrate: String,
    fat: String,
    fiber: String,
}

impl<'a> From<&'a LoggedMeal> for MealRow<'a> {
    fn from(meal: &'a LoggedMeal) -> Self {
        let m = &meal.macros;
        MealRow {
            date: meal.meal_date.format("%Y-%m-%d").to_string(),
            meal_type: meal.meal_type.as_str(),
            food: &meal.food_name,
            quantity_g: format!("{:.1}", meal.quantity_g),
            calories: format!("{:.1}", m.calories),
            protein: format!("{:.1}", m.protein),
            carbohydrate: format!("{:.1}", m.carbohydrate),
            fat: format!("{:.1}", m.fat),
            fiber: format!("{:.1}", m.fiber),
        }
    }
}

fn writer_builder() -> csv::WriterBuilder {
    let mut builder = csv::WriterBuilder::new();
    builder.has_headers(false).terminator(csv::Terminator::Any(b'\n'));
    builder
}

fn write_meals<W: io::Write>(writer: &mut csv::Writer<W>, meals: &[LoggedMeal]) -> Result<(), ExportError> {
    writer.write_record(CSV_HEADER)?;
    for meal in meals {
        writer.serialize(MealRow::from(meal))?;
    }
    writer.flush()?;
    Ok(())
}

/// One line per meal under a fixed header, `\n` separated.
pub fn meals_to_csv(meals: &[LoggedMeal]) -> Result<String, ExportError> {
    let mut writer = writer_builder().from_writer(Vec::new());
    write_meals(&mut writer, meals)?;
    let bytes = writer.into_inner().map_err(|err| err.into_error())?;
    String::from_utf8(bytes).map_err(|err| ExportError::Io(io::Error::new(io::ErrorKind::InvalidData, err)))
}

/// Writes `export_<user>_<yyyymmdd>.csv` under `dir`, creating it if needed.
pub fn write_export(dir: &Path, user_id: Uuid, date: NaiveDate, meals: &[LoggedMeal]) -> Result<PathBuf, ExportError> {
    fs::create_dir_all(dir)?;
    let path = dir.join(format!("export_{}_{}.csv", user_id, date.format("%Y%m%d")));
    let mut writer = writer_builder().from_path(&path)?;
    write_meals(&mut writer, meals)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::macros::CanonicalMacros;
    use crate::models::meal::MealType;
    use chrono::Utc;

    fn meal(name: &str) -> LoggedMeal {
        LoggedMeal {
            meal_id: Uuid::nil(),
            user_id: Uuid::nil(),
            meal_type: MealType::Breakfast,
            meal_date: NaiveDate::from_ymd_opt(2024, 5, 2).unwrap(),
            logged_at: Utc::now(),
            food_id: 42,
            food_name: name.to_string(),
            quantity_g: 150.0,
            macros: CanonicalMacros { protein: 46.5, carbohydrate: 0.0, fat: 5.4, calories: 247.5, fiber: 0.0 },
        }
    }

    #[test]
    fn header_only_for_no_meals() {
        assert_eq!(meals_to_csv(&[]).unwrap(), "date,meal_type,food,quantity_g,calories,protein,carbohydrate,fat,fiber\n");
    }

    #[test]
    fn rows_use_one_decimal() {
        let csv = meals_to_csv(&[meal("Chicken breast")]).unwrap();
        let line = csv.lines().nth(1).unwrap();
        assert_eq!(line, "2024-05-02,breakfast,Chicken breast,150.0,247.5,46.5,0.0,5.4,0.0");
    }

    #[test]
    fn food_names_with_commas_are_quoted() {
        let csv = meals_to_csv(&[meal("Rice, white, \"long\" grain")]).unwrap();
        assert!(csv.contains(",\"Rice, white, \"\"long\"\" grain\",150.0,"));
    }

    #[test]
    fn multiline_names_read_back_intact() {
        let csv = meals_to_csv(&[meal("Soup\nwith \"croutons\"")]).unwrap();

        let mut reader = csv::Reader::from_reader(csv.as_bytes());
        let headers = reader.headers().unwrap().clone();
        assert_eq!(headers.iter().collect::<Vec<_>>(), CSV_HEADER);

        let rows: Vec<csv::StringRecord> = reader.records().map(Result::unwrap).collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(&rows[0][2], "Soup\nwith \"croutons\"");
    }

    #[test]
    fn writes_file_into_export_dir() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("exports");
        let date = NaiveDate::from_ymd_opt(2024, 5, 31).unwrap();

        let path = write_export(&target, Uuid::nil(), date, &[meal("Oats")]).unwrap();

        assert!(path.ends_with(format!("export_{}_20240531.csv", Uuid::nil())));
        let written = std::fs::read_to_string(path).unwrap();
        assert_eq!(written.lines().count(), 2);
    }
}
