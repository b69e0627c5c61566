//! Webview page hosting the APL renderer.

/// Content security policy of the preview page: scripts from the host's
/// resource scheme or https, inline styles, https/data images.
pub const CONTENT_SECURITY_POLICY: &str = "default-src https: data:; \
    img-src https: data:; \
    script-src vscode-resource: https: data: 'unsafe-inline' 'unsafe-eval'; \
    style-src vscode-resource: 'unsafe-inline';";

/// Build the preview page.
///
/// `viewhost_script` is only loaded when the page has no `AplRenderer` yet;
/// `preview_script` receives [`RenderMessage`](super::RenderMessage)s.
pub fn build_preview_html(preview_script: &str, viewhost_script: &str) -> String {
    let preview_script = escape_attribute(preview_script);
    let viewhost_script = escape_attribute(viewhost_script);
    let csp = CONTENT_SECURITY_POLICY;
    format!(
        r#"<!DOCTYPE html>
<html>
  <head>
    <meta http-equiv="Content-Security-Policy" content="{csp}" />
    <title>APL Preview</title>
    <script>window.AplRenderer || document.write('<script src="{viewhost_script}"><\/script>')</script>
    <script src="{preview_script}"></script>
  </head>
  <style>
    body {{
      font: 14px "Lucida Grande", Helvetica, Arial, sans-serif;
    }}
    :focus {{
      outline: none;
    }}
  </style>
  <body>
    <div></div>
  </body>
</html>
"#
    )
}

fn escape_attribute(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
