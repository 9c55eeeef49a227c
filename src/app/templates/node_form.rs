use super::layout::escape;

pub fn node_form_template(value: Option<&str>, error: Option<&str>) -> String {
    let error = match error {
        Some(error) => format!("<p><mark>{}</mark></p>", escape(error)),
        None => String::new(),
    };

    format!(
        "
    <form method=\"get\" action=\"/nodes\" role=\"search\">
      <input type=\"number\" min=\"0\" name=\"node_id\" id=\"node_id\" placeholder=\"42\" value=\"{}\">
      <button type=\"submit\">Go</button>
    </form>
    {}
    ",
        escape(value.unwrap_or_default()),
        error
    )
}
