use chrono::NaiveDateTime;

/// parse a location `date_time` string into epoch seconds. accepts
/// `YYYY-MM-DDTHH:MM` with optional seconds; time zone resolution is an
/// external collaborator, so values are taken as UTC.
pub fn parse_epoch_seconds(date_time: &str) -> Result<u64, chrono::ParseError> {
    let parsed = NaiveDateTime::parse_from_str(date_time, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(date_time, "%Y-%m-%dT%H:%M"))?;
    Ok(parsed.and_utc().timestamp().max(0) as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_and_without_seconds() {
        let a = parse_epoch_seconds("1970-01-01T00:02").unwrap();
        assert_eq!(a, 120);
        let b = parse_epoch_seconds("1970-01-01T00:02:05").unwrap();
        assert_eq!(b, 125);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_epoch_seconds("next tuesday").is_err());
    }
}
