use crate::parsers::parse_page;
use crate::parsers::records::RecordExtractor;

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>ICT Jobs in New Zealand</title>
  <script>window.SEEK_CONFIG = {"jobId": "0", "token": "nope"};</script>
</head>
<body>
  <header id="top"><nav class="site-nav"><a href="/">Home</a></nav></header>
  <div id="app">
    <article class="_1wkzzau0" data-automation="normalJob"
      data-search-sol-meta='{"searchRequestToken":"5f1c-77aa-4b2e","token":"0~5f1c","jobId":"79011111","section":1,"sectionRank":1}'>
      <img src="logo.png" alt="Company">
      <h3><a href="/job/79011111">Senior Rust Engineer</a></h3>
    </article>
    <article class="_1wkzzau0" data-automation="premiumJob"
      data-search-sol-meta='{"searchRequestToken":"5f1c-77aa-4b2e","token":"0~5f1c","jobId":"79022222","section":1,"sectionRank":2}'>
      <h3><a href="/job/79022222">Platform Engineer</a></h3>
    </article>
  </div>
  <footer>&copy; Listings Ltd</footer>
</body>
</html>"#;

    #[test]
    fn test_parse_listing_page() {
        let page = parse_page(LISTING_PAGE, &RecordExtractor::default(), 30);

        let ids: Vec<&str> = page.records().iter().map(|r| r.job_id.as_str()).collect();
        assert_eq!(ids, vec!["79011111", "79022222"]);
        assert!(page.records().iter().all(|r| r.search_request_token == "5f1c77aa4b2e"));

        assert!(page.cleaned_html.contains("Senior Rust Engineer"));
        assert!(!page.cleaned_html.contains("SEEK_CONFIG"));
        assert!(!page.cleaned_html.contains("class="));
        assert!(!page.cleaned_html.contains("Listings Ltd"));
    }

    #[test]
    fn test_parse_page_respects_limit() {
        let page = parse_page(LISTING_PAGE, &RecordExtractor::default(), 1);
        assert_eq!(page.records().len(), 1);
        assert_eq!(page.records()[0].job_id, "79011111");
    }
}
