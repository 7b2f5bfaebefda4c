//! Built-in converters

use crate::error::{Error, Result};
use std::fmt::Display;
use std::str::FromStr;

/// Converter for any `FromStr` type. Surrounding whitespace is trimmed.
pub fn from_str_converter<T>() -> impl Fn(Option<&str>) -> Result<Option<T>> + Send + Sync
where
    T: FromStr,
    T::Err: Display,
{
    |raw: Option<&str>| match raw {
        None => Ok(None),
        Some(s) => s
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| Error::conversion::<T>(s, e)),
    }
}

/// Comma-separated list of strings; entries are trimmed and empty entries
/// dropped.
pub fn string_list_converter() -> impl Fn(Option<&str>) -> Result<Option<Vec<String>>> + Send + Sync {
    |raw: Option<&str>| Ok(raw.map(|s| split_list(s).map(str::to_string).collect()))
}

/// Comma-separated list of integers. An empty string is an empty list.
pub fn int_list_converter() -> impl Fn(Option<&str>) -> Result<Option<Vec<i64>>> + Send + Sync {
    |raw: Option<&str>| match raw {
        None => Ok(None),
        Some(s) => split_list(s)
            .map(|item| {
                item.parse::<i64>()
                    .map_err(|e| Error::conversion::<Vec<i64>>(s, e))
            })
            .collect::<Result<Vec<_>>>()
            .map(Some),
    }
}

fn split_list(s: &str) -> impl Iterator<Item = &str> {
    s.split(',').map(str::trim).filter(|item| !item.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinates::Coordinates;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("true", true)]
    #[case(" false ", false)]
    fn test_bool(#[case] input: &str, #[case] expected: bool) {
        let convert = from_str_converter::<bool>();
        assert_eq!(convert(Some(input)).unwrap(), Some(expected));
    }

    #[rstest]
    #[case("yes")]
    #[case("")]
    fn test_bool_rejects_other_words(#[case] input: &str) {
        let convert = from_str_converter::<bool>();
        assert!(matches!(convert(Some(input)), Err(Error::Conversion { .. })));
    }

    #[test]
    fn test_numbers() {
        assert_eq!(from_str_converter::<i64>()(Some(" -42 ")).unwrap(), Some(-42));
        assert_eq!(from_str_converter::<u16>()(Some("8080")).unwrap(), Some(8080));
        assert_eq!(from_str_converter::<f64>()(Some("0.5")).unwrap(), Some(0.5));
        assert!(from_str_converter::<u16>()(Some("70000")).is_err());
    }

    #[test]
    fn test_none_converts_to_none() {
        assert_eq!(from_str_converter::<i32>()(None).unwrap(), None);
        assert_eq!(string_list_converter()(None).unwrap(), None);
        assert_eq!(int_list_converter()(None).unwrap(), None);
    }

    #[test]
    fn test_string_list() {
        let list = string_list_converter()(Some(" a, b ,, c ,")).unwrap();
        assert_eq!(list, Some(vec!["a".to_string(), "b".to_string(), "c".to_string()]));
    }

    #[test]
    fn test_int_list() {
        assert_eq!(int_list_converter()(Some("1, 2,3")).unwrap(), Some(vec![1, 2, 3]));
        assert_eq!(int_list_converter()(Some("")).unwrap(), Some(vec![]));
        assert!(int_list_converter()(Some("1, two")).is_err());
    }

    #[test]
    fn test_coordinates() {
        let convert = from_str_converter::<Coordinates>();
        let coordinates = convert(Some("{region=west, phase=experimental}")).unwrap().unwrap();
        assert_eq!(coordinates.get("region"), Some("west"));
        assert_eq!(coordinates.len(), 2);
        assert!(convert(Some("{region}")).is_err());
    }
}
