// Reads a numeric member of a JSON object, yielding `None` when it is absent,
// not a number, or not finite ("NaN" strings and nulls included).
macro_rules! finite_field {
    ($value:expr, $name:expr) => (
        match $value.get($name).and_then(|v| v.as_f64()) {
            Some(v) if v.is_finite() => Some(v),
            _ => None
        }
    )
}

// Reads an integer member of a JSON object, ignoring anything else.
macro_rules! int_field {
    ($value:expr, $name:expr) => (
        $value.get($name).and_then(|v| v.as_i64())
    )
}

// Reads a string member of a JSON object, falling back to `$default`.
macro_rules! string_or_default {
    ($value:expr, $name:expr, $default:expr) => (
        match $value.get($name).and_then(|v| v.as_str()) {
            Some(v) => v.to_string(),
            None => $default.to_string()
        }
    )
}
