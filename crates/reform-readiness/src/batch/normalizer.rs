/// Strips invisible characters that spreadsheet exports leave behind, then trims.
pub(crate) fn clean_field(value: &str) -> String {
    value.replace(['\u{feff}', '\u{200b}'], "").trim().to_string()
}
