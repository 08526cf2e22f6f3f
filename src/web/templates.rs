//! HTML pages.

use crate::predict::{Prediction, PriceQuery};

const STYLE: &str = r#"
    body { font-family: sans-serif; max-width: 32rem; margin: 3rem auto; color: #222; }
    h1 { font-size: 1.5rem; }
    label { display: block; margin-top: 1rem; }
    input { width: 100%; padding: 0.4rem; box-sizing: border-box; }
    button { margin-top: 1.5rem; padding: 0.5rem 1.5rem; }
    dl { display: grid; grid-template-columns: max-content auto; gap: 0.4rem 1rem; }
    dt { font-weight: bold; }
    .estimate { font-size: 1.4rem; margin-top: 1.5rem; }
    .note { color: #a60; }
"#;

fn page(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <title>{title}</title>
    <style>{style}</style>
</head>
<body>
{body}
</body>
</html>
"#,
        title = html_escape(title),
        style = STYLE,
        body = body
    )
}

/// Input form posting to `/submit`.
pub fn index() -> String {
    page(
        "House Price Estimate",
        r#"<h1>House Price Estimate</h1>
<form action="/submit" method="post">
    <label for="location">Location</label>
    <input id="location" name="location" type="text" placeholder="1st Phase JP Nagar" required>
    <label for="sqft">Total square feet</label>
    <input id="sqft" name="sqft" type="number" min="1" max="50000" step="any" required>
    <label for="bath">Bathrooms</label>
    <input id="bath" name="bath" type="number" min="1" max="20" step="1" required>
    <label for="size">Bedrooms (BHK)</label>
    <input id="size" name="size" type="number" min="1" max="20" step="1" required>
    <button type="submit">Estimate</button>
</form>"#,
    )
}

/// Result page echoing the inputs and the estimate.
pub fn output(query: &PriceQuery, prediction: &Prediction) -> String {
    let note = if prediction.location_matched {
        String::new()
    } else {
        format!(
            "\n<p class=\"note\">Location &quot;{}&quot; is not known to the model; the estimate ignores it.</p>",
            html_escape(&query.location)
        )
    };

    let body = format!(
        r#"<h1>Estimated Price</h1>
<dl>
    <dt>Location</dt><dd>{location}</dd>
    <dt>Square feet</dt><dd>{sqft}</dd>
    <dt>Bathrooms</dt><dd>{bath}</dd>
    <dt>Bedrooms (BHK)</dt><dd>{size}</dd>
</dl>
<p class="estimate">Estimate: <strong>{price:.2}</strong></p>{note}
<p><a href="/">Try another</a></p>"#,
        location = html_escape(&query.location),
        sqft = query.sqft,
        bath = query.bath,
        size = query.size,
        price = prediction.price,
        note = note
    );

    page("Estimated Price", &body)
}

/// Escape text for HTML element and attribute content.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
