use crate::app::config::APP_NAME;

const LIVE_RELOAD_SCRIPT: &str = r#"
<script>
(function () {
  let bootId = null;
  setInterval(async function () {
    try {
      const res = await fetch("/live-reload", { cache: "no-store" });
      if (!res.ok) return;
      const id = await res.text();
      if (bootId === null) {
        bootId = id;
      } else if (id !== bootId) {
        location.reload();
      }
    } catch (e) {}
  }, 1000);
})();
</script>
"#;

pub fn layout_template(title: &str, body: &str, live_reload: bool) -> String {
    let script = if live_reload { LIVE_RELOAD_SCRIPT } else { "" };

    format!(
        "<!doctype html>
<html>
<head>
  <meta charset=\"utf-8\">
  <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">
  <title>{} | {}</title>
  <link rel=\"stylesheet\" href=\"https://cdn.jsdelivr.net/npm/@picocss/pico@2/css/pico.min.css\">
</head>
<body>
  <main class=\"container\">
    <nav>
      <ul><li><strong><a href=\"/\">{}</a></strong></li></ul>
      <ul><li><a href=\"/rankings\">Rankings</a></li></ul>
    </nav>
    <h1>{}</h1>
    {}
  </main>
  {}
</body>
</html>
",
        escape(title),
        APP_NAME,
        APP_NAME,
        escape(title),
        body,
        script
    )
}

pub fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());

    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }

    escaped
}
