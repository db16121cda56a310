use serde::Serialize;
use serde_json::Value;

pub fn is_json(input: &str) -> bool {
    serde_json::from_str::<Value>(input).is_ok()
}

pub fn to_json<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(value)
}

/// Removes elements equal to `value`, returning how many were removed.
pub fn array_remove<T: PartialEq>(items: &mut Vec<T>, value: &T, first_only: bool) -> usize {
    if first_only {
        match items.iter().position(|item| item == value) {
            Some(index) => {
                items.remove(index);
                1
            }
            None => 0,
        }
    } else {
        let before = items.len();
        items.retain(|item| item != value);
        before - items.len()
    }
}

pub fn str_remove_first(haystack: &str, needle: &str) -> String {
    haystack.replacen(needle, "", 1)
}
