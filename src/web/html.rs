use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};

use crate::contact::{Contact, DEFAULT_LIMIT, MAX_LIMIT};
use crate::export::{CSV_HEADERS, record};

use super::ContactForm;

/// Escape text for embedding in HTML element content or quoted attributes.
pub(crate) fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Status line shown above the results.
pub(crate) enum Notice {
    Success(String),
    Warning(String),
    Error(String),
}

impl Notice {
    fn render(&self) -> String {
        let (class, text) = match self {
            Notice::Success(t) => ("success", t),
            Notice::Warning(t) => ("warning", t),
            Notice::Error(t) => ("error", t),
        };
        format!("<p class=\"notice {class}\">{}</p>\n", escape_html(text))
    }
}

pub(crate) fn form_page(form: &ContactForm, notice: Option<&Notice>) -> String {
    let mut body = render_form(form);
    if let Some(notice) = notice {
        body.push_str(&notice.render());
    }
    page(&body)
}

pub(crate) fn results_page(
    form: &ContactForm,
    notice: &Notice,
    contacts: &[Contact],
    csv: &[u8],
) -> String {
    let mut body = render_form(form);
    body.push_str(&notice.render());
    if !contacts.is_empty() {
        body.push_str(&render_table(contacts));
        body.push_str(&download_link(csv));
    }
    page(&body)
}

fn page(body: &str) -> String {
    format!(
        "<!DOCTYPE html>
<html lang=\"en\">
<head>
<meta charset=\"utf-8\">
<title>Contact Finder</title>
<style>
body {{ font-family: sans-serif; margin: 2rem; }}
label {{ display: block; margin-top: 0.75rem; }}
table {{ border-collapse: collapse; margin-top: 1rem; }}
th, td {{ border: 1px solid #ccc; padding: 0.25rem 0.5rem; text-align: left; }}
.success {{ color: #1a7f37; }}
.warning {{ color: #9a6700; }}
.error {{ color: #cf222e; }}
</style>
</head>
<body>
<h1>Contact Finder</h1>
{body}</body>
</html>
"
    )
}

fn render_form(form: &ContactForm) -> String {
    let limit = if form.limit.trim().is_empty() {
        DEFAULT_LIMIT.to_string()
    } else {
        form.limit.trim().to_string()
    };
    format!(
        "<form method=\"post\" action=\"/\">
<label>Company domain (e.g. tcs.com)
<input type=\"text\" name=\"domain\" value=\"{domain}\"></label>
<label>Job title keyword (e.g. HR Manager)
<input type=\"text\" name=\"designation\" value=\"{designation}\"></label>
<label>Optional: location (e.g. Mumbai or New York)
<input type=\"text\" name=\"location\" value=\"{location}\"></label>
<label>How many results to return? (max {MAX_LIMIT})
<input type=\"number\" name=\"limit\" min=\"1\" max=\"{MAX_LIMIT}\" value=\"{limit}\"></label>
<p><button type=\"submit\">Find Contacts</button></p>
</form>
",
        domain = escape_html(&form.domain),
        designation = escape_html(&form.designation),
        location = escape_html(&form.location),
        limit = escape_html(&limit),
    )
}

fn render_table(contacts: &[Contact]) -> String {
    let mut out = String::from("<table>\n<thead><tr>");
    for header in CSV_HEADERS {
        out.push_str(&format!("<th>{header}</th>"));
    }
    out.push_str("</tr></thead>\n<tbody>\n");
    for contact in contacts {
        out.push_str("<tr>");
        for cell in record(contact) {
            out.push_str(&format!("<td>{}</td>", escape_html(&cell)));
        }
        out.push_str("</tr>\n");
    }
    out.push_str("</tbody>\n</table>\n");
    out
}

fn download_link(csv: &[u8]) -> String {
    let encoded = utf8_percent_encode(&String::from_utf8_lossy(csv), NON_ALPHANUMERIC).to_string();
    format!(
        "<p><a href=\"data:text/csv;charset=utf-8,{encoded}\" \
         download=\"contacts.csv\">Download CSV</a></p>\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup() {
        assert_eq!(escape_html("plain"), "plain");
        assert_eq!(
            escape_html(r#"<a href="x">O'Neil & Co</a>"#),
            "&lt;a href=&quot;x&quot;&gt;O&#39;Neil &amp; Co&lt;/a&gt;"
        );
    }

    #[test]
    fn form_keeps_submitted_values_escaped() {
        let form = ContactForm {
            domain: "tcs.com".into(),
            designation: "\"><script>".into(),
            location: String::new(),
            limit: String::new(),
        };
        let html = form_page(&form, None);
        assert!(html.contains("value=\"tcs.com\""));
        assert!(html.contains("value=\"&quot;&gt;&lt;script&gt;\""));
        assert!(!html.contains("<script>"));
        assert!(html.contains(&format!("value=\"{DEFAULT_LIMIT}\"")));
    }

    #[test]
    fn results_page_links_csv_as_data_uri() {
        let contacts = vec![Contact {
            first_name: "Asha".into(),
            location: "Mumbai, India".into(),
            ..Default::default()
        }];
        let csv = b"FirstName\nAsha\n";
        let html = results_page(
            &ContactForm::default(),
            &Notice::Success("Found 1 person".into()),
            &contacts,
            csv,
        );
        assert!(html.contains("<td>Mumbai, India</td>"));
        assert!(html.contains("<th>PhoneSource</th>"));
        assert!(html.contains("href=\"data:text/csv;charset=utf-8,FirstName%0AAsha%0A\""));
        assert!(html.contains("download=\"contacts.csv\""));
        assert!(html.contains("class=\"notice success\""));
    }

    #[test]
    fn empty_results_have_no_table() {
        let html = results_page(
            &ContactForm::default(),
            &Notice::Warning("No matching people found.".into()),
            &[],
            b"",
        );
        assert!(!html.contains("<table>"));
        assert!(!html.contains("Download CSV"));
        assert!(html.contains("No matching people found."));
    }
}
