//! Route code formatting.
//!
//! Upstream route codes carry suffixes and decorations that riders never see
//! on the front of the bus, e.g. `"500-CA"` or `"EXP 500 CA"`. The display
//! form is what gets printed on the board.

/// Normalize a raw route code into its display form.
///
/// Hyphens are removed and the result is split on whitespace. The first
/// token is the route number if it contains a digit. Otherwise it is an
/// alphabetic prefix (e.g. an express marker) and the second token, if any,
/// is kept alongside it.
///
/// Total: every input, including the empty string, produces an output.
///
/// # Examples
///
/// ```
/// use arrivals_server::domain::format_route_number;
///
/// assert_eq!(format_route_number("500-CA"), "500CA");
/// assert_eq!(format_route_number("EXP 500 CA"), "EXP 500");
/// assert_eq!(format_route_number("AB"), "AB");
/// assert_eq!(format_route_number(""), "");
/// ```
pub fn format_route_number(raw: &str) -> String {
    let no_dash: String = raw.chars().filter(|&c| c != '-').collect();
    let mut tokens = no_dash.split_whitespace();

    let Some(first) = tokens.next() else {
        return no_dash;
    };

    if first.chars().any(|c| c.is_ascii_digit()) {
        return first.to_string();
    }

    match tokens.next() {
        Some(second) => format!("{first} {second}"),
        None => first.to_string(),
    }
}
