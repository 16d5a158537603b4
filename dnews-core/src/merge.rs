use std::collections::HashSet;

use crate::article::Article;

/// Concatenates `lists` in the given order and drops duplicate urls.
///
/// The first occurrence of a url wins and keeps its relative position, so the
/// primary list's most-recent-first ordering survives. Articles without a url
/// cannot be deduplicated and are dropped.
pub fn merge<I, L>(lists: I) -> Vec<Article>
where
    I: IntoIterator<Item = L>,
    L: IntoIterator<Item = Article>,
{
    let mut seen: HashSet<String> = HashSet::new();
    let mut merged = Vec::new();
    for article in lists.into_iter().flatten() {
        let Some(url) = article.url() else {
            continue;
        };
        if seen.insert(url.to_owned()) {
            merged.push(article);
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn article(url: Option<&str>, title: &str) -> Article {
        let value = match url {
            Some(url) => json!({"url": url, "title": title}),
            None => json!({"title": title}),
        };
        Article::from_value(value).unwrap()
    }

    fn titles(articles: &[Article]) -> Vec<&str> {
        articles.iter().filter_map(Article::title).collect()
    }

    #[test]
    fn overlapping_url_is_kept_at_first_occurrence() {
        let en = vec![article(Some("u1"), "en-1"), article(Some("u2"), "en-2")];
        let vi = vec![article(Some("u3"), "vi-1"), article(Some("u1"), "vi-dup")];

        let merged = merge([en, vi]);
        assert_eq!(merged.len(), 3);
        assert_eq!(titles(&merged), ["en-1", "en-2", "vi-1"]);
    }

    #[test]
    fn duplicates_within_one_list_are_dropped() {
        let merged = merge([vec![
            article(Some("u1"), "a"),
            article(Some("u1"), "b"),
            article(Some("u2"), "c"),
        ]]);
        assert_eq!(titles(&merged), ["a", "c"]);
    }

    #[test]
    fn articles_without_url_are_excluded() {
        let merged = merge([
            vec![article(None, "no-url"), article(Some(""), "empty-url")],
            vec![article(Some("u1"), "kept")],
        ]);
        assert_eq!(titles(&merged), ["kept"]);
    }

    #[test]
    fn merge_is_deterministic() {
        let en = vec![article(Some("u2"), "a"), article(Some("u1"), "b")];
        let vi = vec![article(Some("u1"), "c"), article(Some("u3"), "d")];
        assert_eq!(merge([en.clone(), vi.clone()]), merge([en, vi]));
    }

    #[test]
    fn empty_inputs_merge_to_empty() {
        assert!(merge(Vec::<Vec<Article>>::new()).is_empty());
        assert!(merge([Vec::new(), Vec::new()]).is_empty());
    }
}
