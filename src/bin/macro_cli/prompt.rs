use std::io::{self, BufRead, Write};
use std::str::FromStr;

/// Line-oriented questions over any reader/writer pair.
pub struct Prompt<R, W> {
    input: R,
    output: W,
}

fn closed() -> io::Error {
    io::Error::new(io::ErrorKind::UnexpectedEof, "input closed")
}

impl<R: BufRead, W: Write> Prompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Prompt { input, output }
    }

    /// Reads one trimmed line after printing `question`. End of input is an
    /// `UnexpectedEof` error.
    pub fn line(&mut self, question: &str) -> io::Result<String> {
        write!(self.output, "{}", question)?;
        self.output.flush()?;

        let mut buf = String::new();
        if self.input.read_line(&mut buf)? == 0 {
            return Err(closed());
        }
        Ok(buf.trim().to_string())
    }

    /// Asks until the answer parses and passes `accept`.
    pub fn number<T, F>(&mut self, question: &str, accept: F) -> io::Result<T>
    where
        T: FromStr,
        F: Fn(&T) -> bool,
    {
        loop {
            match self.line(question)?.parse::<T>() {
                Ok(value) if accept(&value) => return Ok(value),
                _ => writeln!(self.output, "Please enter a valid number.")?,
            }
        }
    }

    /// Like [`Prompt::number`], but a blank answer keeps the current value.
    pub fn optional<T, F>(&mut self, question: &str, accept: F) -> io::Result<Option<T>>
    where
        T: FromStr,
        F: Fn(&T) -> bool,
    {
        loop {
            let answer = self.line(question)?;
            if answer.is_empty() {
                return Ok(None);
            }
            match answer.parse::<T>() {
                Ok(value) if accept(&value) => return Ok(Some(value)),
                _ => writeln!(self.output, "Please enter a valid value or leave blank.")?,
            }
        }
    }

    pub fn confirm(&mut self, question: &str) -> io::Result<bool> {
        let answer = self.line(&format!("{} (y/n): ", question))?;
        Ok(matches!(answer.to_ascii_lowercase().as_str(), "y" | "yes"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn prompt(input: &str) -> Prompt<Cursor<Vec<u8>>, Vec<u8>> {
        Prompt::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    #[test]
    fn number_reasks_until_valid() {
        let mut p = prompt("abc\n-5\n72.5\n");
        let weight: f64 = p.number("Weight: ", |w| *w > 0.0).unwrap();
        assert_eq!(weight, 72.5);

        let output = String::from_utf8(p.output).unwrap();
        assert_eq!(output.matches("Please enter a valid number.").count(), 2);
    }

    #[test]
    fn optional_blank_keeps_value() {
        let mut p = prompt("\n");
        assert_eq!(p.optional::<i32, _>("Age: ", |a| *a > 0).unwrap(), None);
    }

    #[test]
    fn closed_input_is_eof() {
        let mut p = prompt("");
        let err = p.line("> ").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn confirm_accepts_yes() {
        assert!(prompt("Y\n").confirm("Adjust?").unwrap());
        assert!(!prompt("n\n").confirm("Adjust?").unwrap());
    }
}
