use url::Url;

/// Query key the listing site uses to select a page
pub const PAGE_PARAM: &str = "page";

/// Page number and URL of the listing page being processed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageState {
    pub page_number: u32,
    pub url: Url,
}

impl PageState {
    pub fn from_url(url: &Url) -> Self {
        Self {
            page_number: current_page(url),
            url: url.clone(),
        }
    }
}

/// Page number carried by the `page` query parameter.
///
/// Falls back to 1 when the parameter is missing or is not a positive integer.
pub fn current_page(url: &Url) -> u32 {
    url.query_pairs()
        .find(|(key, _)| key == PAGE_PARAM)
        .and_then(|(_, value)| value.trim().parse::<u32>().ok())
        .filter(|page| *page >= 1)
        .unwrap_or(1)
}

/// URL of the page after `url`.
///
/// Every other query pair is kept in its original position. A present
/// `page` pair is replaced where it stands, otherwise one is appended.
/// Nothing is checked against the site.
pub fn next_page_url(url: &Url) -> Url {
    let next = current_page(url).saturating_add(1).to_string();

    let mut pairs: Vec<(String, String)> = Vec::new();
    let mut replaced = false;
    for (key, value) in url.query_pairs() {
        if key == PAGE_PARAM {
            if !replaced {
                pairs.push((key.into_owned(), next.clone()));
                replaced = true;
            }
            continue;
        }
        pairs.push((key.into_owned(), value.into_owned()));
    }
    if !replaced {
        pairs.push((PAGE_PARAM.to_string(), next));
    }

    let mut next_url = url.clone();
    next_url.query_pairs_mut().clear().extend_pairs(pairs);
    next_url
}
