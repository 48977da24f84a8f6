/// Derive a binding identifier from a package specifier.
///
/// A leading `@scope/` is dropped, `/`, `-` and `.` become `_`, and a
/// leading digit gets an `_` prefix: `@types/node` gives `node`,
/// `react-dom/server` gives `react_dom_server`.
pub fn package_ident(specifier: &str) -> String {
    let unscoped = match specifier.strip_prefix('@') {
        Some(rest) => rest.split_once('/').map_or(specifier, |(_, name)| name),
        None => specifier,
    };

    let mut ident: String = unscoped
        .chars()
        .map(|c| match c {
            '/' | '-' | '.' => '_',
            c => c,
        })
        .collect();
    if ident.starts_with(|c: char| c.is_ascii_digit()) {
        ident.insert(0, '_');
    }
    ident
}
