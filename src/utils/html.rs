// src/utils/html.rs

/// Escapes text for safe interpolation into HTML, including attribute values.
///
/// Tenant labels and icons originate from user input, so everything
/// rendered into a page goes through here.
pub fn escape(input: &str) -> String {
    ammonia::clean_text(input)
}

/// Wraps page content in the shared document shell.
pub fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="de">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
</head>
<body>
<main>
{body}
</main>
</body>
</html>
"#,
        title = escape(title),
    )
}
