#[cfg(test)]
mod tests {

    mod slug_tests {
        use crate::services::slug::{generate_slug, validate_slug, MAX_SLUG_LEN};

        #[test]
        fn test_generate_slug_basic() {
            assert_eq!(generate_slug("Hello World"), "hello-world");
        }

        #[test]
        fn test_generate_slug_special_characters() {
            assert_eq!(generate_slug("Hello, World!"), "hello-world");
        }

        #[test]
        fn test_generate_slug_empty() {
            assert_eq!(generate_slug(""), "");
        }

        #[test]
        fn test_generate_slug_only_symbols() {
            assert_eq!(generate_slug("!!!???"), "");
        }

        #[test]
        fn test_generate_slug_keeps_hyphens_and_underscores() {
            assert_eq!(generate_slug("rust-lang snake_case"), "rust-lang-snake_case");
        }

        #[test]
        fn test_generate_slug_collapses_whitespace_runs() {
            assert_eq!(generate_slug("Hello \t\n  World"), "hello-world");
        }

        #[test]
        fn test_generate_slug_does_not_trim() {
            assert_eq!(generate_slug("  Hello World  "), "-hello-world-");
        }

        #[test]
        fn test_generate_slug_drops_non_ascii_letters() {
            assert_eq!(generate_slug("Café au lait"), "caf-au-lait");
        }

        #[test]
        fn test_generate_slug_numbers() {
            assert_eq!(generate_slug("Article 123"), "article-123");
        }

        #[test]
        fn test_generate_slug_truncates() {
            let title = "word ".repeat(60);
            let slug = generate_slug(&title);
            assert_eq!(slug.chars().count(), MAX_SLUG_LEN);
            assert!(slug.starts_with("word-word-"));
        }

        #[test]
        fn test_generate_slug_is_idempotent() {
            let titles = [
                "Hello, World!",
                "  Leading and trailing  ",
                "Mixed CASE with 42 numbers & symbols #!",
                "snake_case-and-kebab",
                &"long title ".repeat(30),
            ];
            for title in titles {
                let once = generate_slug(title);
                assert_eq!(generate_slug(&once), once, "not idempotent for {:?}", title);
            }
        }

        #[test]
        fn test_validate_slug_valid() {
            assert!(validate_slug("hello-world"));
            assert!(validate_slug("my_blog_post-2024"));
            assert!(validate_slug("a"));
        }

        #[test]
        fn test_validate_slug_invalid() {
            assert!(!validate_slug(""));
            assert!(!validate_slug("Hello-World"));
            assert!(!validate_slug("hello world"));
            assert!(!validate_slug(&"a".repeat(201)));
        }
    }

    mod resolver_tests {
        use crate::error::BlogError;
        use crate::services::slug::resolve_unique_slug;
        use std::collections::HashMap;

        fn store(entries: &[(&str, &str)]) -> HashMap<String, String> {
            entries
                .iter()
                .map(|(slug, id)| (slug.to_string(), id.to_string()))
                .collect()
        }

        #[test]
        fn test_free_candidate_is_returned_unchanged() {
            let existing = store(&[("other", "1")]);
            let slug =
                resolve_unique_slug("fresh", None, 10, |s| Ok(existing.get(s).cloned())).unwrap();
            assert_eq!(slug, "fresh");
        }

        #[test]
        fn test_appends_first_free_suffix() {
            let existing = store(&[("a", "1"), ("a-1", "2"), ("a-2", "3")]);
            let slug =
                resolve_unique_slug("a", None, 10, |s| Ok(existing.get(s).cloned())).unwrap();
            assert_eq!(slug, "a-3");
        }

        #[test]
        fn test_excluded_owner_keeps_its_slug() {
            let existing = store(&[("a", "1"), ("a-1", "2")]);
            let slug =
                resolve_unique_slug("a", Some("1"), 10, |s| Ok(existing.get(s).cloned())).unwrap();
            assert_eq!(slug, "a");
        }

        #[test]
        fn test_excluded_owner_of_a_suffix_reuses_it() {
            let existing = store(&[("a", "1"), ("a-1", "2")]);
            let slug =
                resolve_unique_slug("a", Some("2"), 10, |s| Ok(existing.get(s).cloned())).unwrap();
            assert_eq!(slug, "a-1");
        }

        #[test]
        fn test_one_lookup_per_probe() {
            let existing = store(&[("a", "1"), ("a-1", "2")]);
            let mut probes = Vec::new();
            resolve_unique_slug("a", None, 10, |s| {
                probes.push(s.to_string());
                Ok(existing.get(s).cloned())
            })
            .unwrap();
            assert_eq!(probes, vec!["a", "a-1", "a-2"]);
        }

        #[test]
        fn test_gives_up_after_max_attempts() {
            let err = resolve_unique_slug("a", None, 3, |_| Ok(Some("taken".to_string())))
                .unwrap_err();
            match err.downcast_ref::<BlogError>() {
                Some(BlogError::SlugExhausted { slug, attempts }) => {
                    assert_eq!(slug, "a");
                    assert_eq!(*attempts, 3);
                }
                other => panic!("unexpected error: {:?}", other),
            }
        }

        #[test]
        fn test_lookup_errors_propagate() {
            let result = resolve_unique_slug("a", None, 3, |_| Err(anyhow::anyhow!("store offline")));
            assert!(result.unwrap_err().to_string().contains("store offline"));
        }
    }

    mod tag_tests {
        use crate::services::tags::{add_tag, normalize_tags, parse_tag_list};

        #[test]
        fn test_add_tag_suppresses_duplicates() {
            let mut tags = vec!["rust".to_string()];
            assert!(!add_tag(&mut tags, "rust"));
            assert!(!add_tag(&mut tags, "  rust "));
            assert!(add_tag(&mut tags, "web"));
            assert_eq!(tags, vec!["rust", "web"]);
        }

        #[test]
        fn test_add_tag_ignores_blank() {
            let mut tags = Vec::new();
            assert!(!add_tag(&mut tags, "   "));
            assert!(tags.is_empty());
        }

        #[test]
        fn test_normalize_tags_keeps_first_seen_order() {
            let tags = normalize_tags(["b", "a", " b", "", "c", "a"]);
            assert_eq!(tags, vec!["b", "a", "c"]);
        }

        #[test]
        fn test_parse_tag_list() {
            assert_eq!(
                parse_tag_list("rust, web,, rust ,tutorial"),
                vec!["rust", "web", "tutorial"]
            );
            assert!(parse_tag_list("").is_empty());
        }
    }

    mod markdown_tests {
        use crate::services::markdown::{reading_time_minutes, MarkdownRenderer};

        #[test]
        fn test_render_basic_markdown() {
            let renderer = MarkdownRenderer::new();
            let html = renderer.render("# Hello World");
            assert!(html.contains("<h1>"));
            assert!(html.contains("Hello World"));
        }

        #[test]
        fn test_render_bold_italic() {
            let renderer = MarkdownRenderer::new();
            let html = renderer.render("**bold** and *italic*");
            assert!(html.contains("<strong>bold</strong>"));
            assert!(html.contains("<em>italic</em>"));
        }

        #[test]
        fn test_render_table() {
            let renderer = MarkdownRenderer::new();
            let html = renderer.render("| A | B |\n|---|---|\n| 1 | 2 |");
            assert!(html.contains("<table>"));
            assert!(html.contains("<td>"));
        }

        #[test]
        fn test_render_strips_scripts() {
            let renderer = MarkdownRenderer::new();
            let html = renderer.render("Hi <script>alert('x')</script>");
            assert!(!html.contains("<script>"));
            assert!(html.contains("Hi"));
        }

        #[test]
        fn test_render_links_get_noopener() {
            let renderer = MarkdownRenderer::new();
            let html = renderer.render("[Link](https://example.com)");
            assert!(html.contains("href=\"https://example.com\""));
            assert!(html.contains("noopener"));
        }

        #[test]
        fn test_reading_time_rounds_up() {
            assert_eq!(reading_time_minutes("word ".repeat(199).trim_end()), 1);
            assert_eq!(reading_time_minutes("word ".repeat(201).trim_end()), 2);
            assert_eq!(reading_time_minutes("word ".repeat(400).trim_end()), 2);
        }

        #[test]
        fn test_reading_time_of_empty_content() {
            assert_eq!(reading_time_minutes(""), 1);
        }
    }

    mod config_tests {
        use crate::Config;

        const MINIMAL: &str = r#"
[site]
title = "Test"
url = "http://localhost:3000"

[database]
path = "./data/test.db"
"#;

        #[test]
        fn test_defaults_fill_missing_sections() {
            let config = Config::parse(MINIMAL).unwrap();
            assert_eq!(config.server.port, 3000);
            assert_eq!(config.content.posts_per_page, 10);
            assert_eq!(config.content.slug_max_attempts, 100);
            assert_eq!(config.admin.author_header, "x-author-id");
            assert_eq!(config.database.pool_size, 10);
        }

        #[test]
        fn test_rejects_zero_posts_per_page() {
            let raw = format!("{}\n[content]\nposts_per_page = 0\n", MINIMAL);
            assert!(Config::parse(&raw).is_err());
        }

        #[test]
        fn test_rejects_zero_slug_attempts() {
            let raw = format!("{}\n[content]\nslug_max_attempts = 0\n", MINIMAL);
            assert!(Config::parse(&raw).is_err());
        }

        #[test]
        fn test_rejects_invalid_author_header() {
            let raw = format!("{}\n[admin]\nauthor_header = \"bad header\"\n", MINIMAL);
            assert!(Config::parse(&raw).is_err());
        }

        #[test]
        fn test_missing_site_is_an_error() {
            assert!(Config::parse("[database]\npath = \"x.db\"\n").is_err());
        }
    }
}
