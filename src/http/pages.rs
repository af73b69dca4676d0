//! HTML pages.
//!
//! Small string builders; every interpolated value goes through [`escape`].

use chrono::{Datelike, NaiveDate};

use crate::model::{FieldErrors, ImageRef, Person, PersonForm};

const TITLE: &str = "Visiting Card";
const HEADING: &str = "42 Coffee Cups Test Assignment";

/// Escape text for use in element content and quoted attributes.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// Long-form date, e.g. `Aug. 22, 2015` or `May 1, 1990`.
pub fn format_date(date: NaiveDate) -> String {
    const MONTHS: [&str; 12] = [
        "Jan.", "Feb.", "March", "April", "May", "June", "July", "Aug.", "Sept.", "Oct.", "Nov.",
        "Dec.",
    ];
    let month = MONTHS[date.month0() as usize];
    format!("{} {}, {}", month, date.day(), date.year())
}

fn layout(body: &str, script: Option<&str>) -> String {
    let script = script
        .map(|s| format!("<script>{}</script>\n", s))
        .unwrap_or_default();
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{TITLE}</title>\n</head>\n<body>\n<h1>{HEADING}</h1>\n{body}\n{script}</body>\n</html>\n"
    )
}

fn nav(authenticated: bool) -> String {
    let mut links = vec![
        "<a href=\"/\">Profile</a>",
        "<a href=\"/request\">requests</a>",
    ];
    if authenticated {
        links.push("<a href=\"/form\">Edit</a>");
    }
    format!("<nav>{}</nav>", links.join(" | "))
}

fn photo(image: Option<&ImageRef>) -> String {
    match image {
        Some(image) => {
            let size = match (image.width, image.height) {
                (Some(w), Some(h)) => format!(" width=\"{}\" height=\"{}\"", w, h),
                _ => String::new(),
            };
            format!(
                "<img id=\"photo\" src=\"/media/{}\" alt=\"Photo\"{}>",
                escape(&image.path),
                size
            )
        }
        None => String::new(),
    }
}

/// The home page for a stored person.
pub fn profile_page(person: &Person, authenticated: bool) -> String {
    let row = |label: &str, value: &str| {
        format!(
            "<tr><th>{}</th><td>{}</td></tr>\n",
            escape(label),
            escape(value)
        )
    };

    let mut body = nav(authenticated);
    body.push_str("\n<section id=\"profile\">\n");
    body.push_str(&photo(person.image.as_ref()));
    body.push_str("\n<table>\n");
    body.push_str(&row("Name", &person.name));
    body.push_str(&row("Last name", &person.surname));
    body.push_str(&row("Date of birth", &format_date(person.date_of_birth)));
    body.push_str(&row("Bio", &person.bio));
    body.push_str("</table>\n<h2>Contacts</h2>\n<table>\n");
    body.push_str(&row("Email", &person.email));
    body.push_str(&row("Jabber", &person.jabber));
    body.push_str(&row("Skype", &person.skype_id));
    body.push_str(&row("Other contacts", &person.other));
    body.push_str("</table>\n</section>");

    layout(&body, None)
}

/// The home page when no person has been stored yet.
pub fn empty_profile_page(authenticated: bool) -> String {
    let mut body = nav(authenticated);
    body.push_str("\n<p id=\"empty\">No contact information yet.</p>");
    layout(&body, None)
}

const FEED_SCRIPT: &str = r#"
(function () {
  var baseTitle = document.title;
  function render(data) {
    var unseen = data[0];
    var records = JSON.parse(data[1]);
    document.title = unseen > 0 ? "(" + unseen + ") " + baseTitle : baseTitle;
    var rows = records.map(function (r) {
      var f = r.fields;
      var cell = function (v) {
        var td = document.createElement("td");
        td.textContent = v === null ? "" : String(v);
        return td;
      };
      var tr = document.createElement("tr");
      if (f.new_request) { tr.className = "new"; }
      [f.date, f.method, f.path, f.user, f.priority].forEach(function (v) {
        tr.appendChild(cell(v));
      });
      return tr;
    });
    var body = document.getElementById("requests");
    body.replaceChildren.apply(body, rows);
  }
  function poll() {
    var xhr = new XMLHttpRequest();
    xhr.open("GET", "/request/ajax");
    xhr.setRequestHeader("X-Requested-With", "XMLHttpRequest");
    xhr.onload = function () {
      if (xhr.status === 200) { render(JSON.parse(xhr.responseText)); }
    };
    xhr.send();
  }
  poll();
  setInterval(poll, 2000);
})();
"#;

/// Static shell that polls the request feed.
pub fn request_page() -> String {
    let body = format!(
        "{}\n<table>\n<thead><tr><th>Date</th><th>Method</th><th>Path</th>\
         <th>User</th><th>Priority</th></tr></thead>\n<tbody id=\"requests\"></tbody>\n</table>",
        nav(false)
    );
    layout(&body, Some(FEED_SCRIPT))
}

/// The edit form, optionally with field errors or a saved notice.
pub fn form_page(
    form: &PersonForm,
    image: Option<&ImageRef>,
    errors: &FieldErrors,
    saved: bool,
) -> String {
    let field_errors = |field: &str| -> String {
        errors
            .get(field)
            .map(|messages| {
                let items: Vec<String> = messages
                    .iter()
                    .map(|m| format!("<li>{}</li>", escape(m)))
                    .collect();
                format!("<ul class=\"errorlist\">{}</ul>", items.join(""))
            })
            .unwrap_or_default()
    };
    let input = |field: &str, label: &str, kind: &str, value: &str| -> String {
        format!(
            "<p>{errors}<label for=\"id_{field}\">{label}:</label> \
             <input type=\"{kind}\" name=\"{field}\" id=\"id_{field}\" value=\"{value}\"></p>\n",
            errors = field_errors(field),
            value = escape(value),
        )
    };
    let textarea = |field: &str, label: &str, value: &str| -> String {
        format!(
            "<p>{errors}<label for=\"id_{field}\">{label}:</label> \
             <textarea name=\"{field}\" id=\"id_{field}\">{value}</textarea></p>\n",
            errors = field_errors(field),
            value = escape(value),
        )
    };

    let mut body = nav(true);
    if saved {
        body.push_str("\n<p id=\"status\">Changes have been saved</p>");
    }
    body.push_str(
        "\n<form id=\"person-form\" method=\"post\" action=\"/form\" enctype=\"multipart/form-data\">\n",
    );
    body.push_str(&input("name", "Name", "text", &form.name));
    body.push_str(&input("surname", "Last name", "text", &form.surname));
    body.push_str(&input("date_of_birth", "Date of birth", "date", &form.date_of_birth));
    body.push_str(&textarea("bio", "Bio", &form.bio));
    body.push_str(&input("email", "Email", "email", &form.email));
    body.push_str(&input("jabber", "Jabber", "text", &form.jabber));
    body.push_str(&input("skype_id", "Skype", "text", &form.skype_id));
    body.push_str(&textarea("other", "Other contacts", &form.other));

    body.push_str("<p>");
    body.push_str(&field_errors("image"));
    body.push_str(&photo(image));
    body.push_str(" <label for=\"id_image\">Photo:</label> <input type=\"file\" name=\"image\" id=\"id_image\">");
    if image.is_some() {
        body.push_str(
            " <input type=\"checkbox\" name=\"image-clear\" id=\"image-clear_id\">\
             <label for=\"image-clear_id\">Clear</label>",
        );
    }
    body.push_str("</p>\n<p><button type=\"submit\">Save</button></p>\n</form>");

    layout(&body, None)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person() -> Person {
        Person {
            id: 1,
            name: "Aleks".into(),
            surname: "Woronow".into(),
            date_of_birth: NaiveDate::from_ymd_opt(2015, 8, 22).unwrap(),
            bio: "<b>bold</b>".into(),
            email: "aleks.woronow@yandex.ru".into(),
            jabber: "42cc@khavr.com".into(),
            skype_id: String::new(),
            other: String::new(),
            image: None,
        }
    }

    #[test]
    fn test_format_date() {
        let date = |m, d| NaiveDate::from_ymd_opt(2015, m, d).unwrap();
        assert_eq!(format_date(date(8, 22)), "Aug. 22, 2015");
        assert_eq!(format_date(date(5, 1)), "May 1, 2015");
        assert_eq!(format_date(date(9, 30)), "Sept. 30, 2015");
        assert_eq!(format_date(date(3, 2)), "March 2, 2015");
    }

    #[test]
    fn test_profile_page_escapes_and_formats() {
        let html = profile_page(&person(), false);
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>Visiting Card</title>"));
        assert!(html.contains("<h1>42 Coffee Cups Test Assignment</h1>"));
        assert!(html.contains("Aug. 22, 2015"));
        assert!(html.contains("&lt;b&gt;bold&lt;/b&gt;"));
        assert!(!html.contains("<b>bold</b>"));
        assert!(!html.contains("href=\"/form\""));
    }

    #[test]
    fn test_form_page_shows_errors_and_clear_box() {
        let mut errors = FieldErrors::new();
        errors.add("email", "Enter a valid email address.");
        let image = ImageRef {
            path: "photo/me.png".into(),
            width: Some(10),
            height: Some(10),
        };
        let html = form_page(
            &PersonForm::from_person(&person()),
            Some(&image),
            &errors,
            false,
        );
        assert!(html.contains("Enter a valid email address."));
        assert!(html.contains("value=\"2015-08-22\""));
        assert!(html.contains("name=\"image-clear\""));
        assert!(html.contains("src=\"/media/photo/me.png\""));
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape("a&b<c>\"d'"), "a&amp;b&lt;c&gt;&quot;d&#x27;");
    }
}
