/// The privacy-policy page. Entirely static; the service stores nothing, so
/// there is nothing dynamic to render.
pub const PRIVACY_POLICY_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Privacy Policy - YouTube Transcript API</title>
</head>
<body>
  <h1>Privacy Policy</h1>
  <p>This service retrieves publicly available transcript data for YouTube
  videos on your behalf and reformats it for your request.</p>
  <h2>What we store</h2>
  <p>Nothing. Requests, video URLs, and transcripts are processed in memory
  and discarded as soon as your response is sent. The service keeps no
  database and writes no request data to disk.</p>
  <h2>Rate limiting</h2>
  <p>To keep the service available to everyone, request counts per client
  address are held in memory for the duration of the counting window. These
  counters contain no request content and disappear when the window passes or
  the service restarts.</p>
  <h2>Third parties</h2>
  <p>Transcript data is fetched from YouTube; your use of this service is
  also subject to YouTube's terms. Video URLs you submit are used only to
  resolve and fetch the transcript you asked for.</p>
  <h2>Contact</h2>
  <p>Questions about this policy can be raised as an issue on the project
  repository.</p>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn privacy_policy_is_a_complete_document() {
        assert!(PRIVACY_POLICY_HTML.starts_with("<!DOCTYPE html>"));
        assert!(PRIVACY_POLICY_HTML.contains("</html>"));
    }
}
