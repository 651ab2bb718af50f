// Unit tests for the text normalizer on realistic post text.
//
// The module's own tests cover each pipeline step in isolation; these run
// whole posts through it the way the extractor does.

use feedsift::text::normalize;

// ============================================================
// Whole posts
// ============================================================

#[test]
fn announcement_post_is_flattened() {
    let raw = "🚀 Excited to announce…\n\n**We're hiring!** Join us hashtag #rust hashtag #jobs";
    assert_eq!(
        normalize(raw),
        "Excited to announce… We're hiring! Join us #rust #jobs"
    );
}

#[test]
fn curly_apostrophes_are_straightened() {
    assert_eq!(normalize("We\u{2019}re live \u{201C}today\u{201D}"), "We're live \"today\"");
}

#[test]
fn math_symbols_are_stripped() {
    assert_eq!(normalize("Revenue ≈ 2× growth"), "Revenue 2 growth");
}

#[test]
fn keycap_sequences_lose_their_decorations() {
    assert_eq!(normalize("1\u{FE0F}\u{20E3} first point"), "1 first point");
}

#[test]
fn non_breaking_and_tab_whitespace_collapse() {
    assert_eq!(normalize("a\u{a0}\u{a0}b\t\tc"), "a b c");
}

#[test]
fn only_noise_normalizes_to_empty() {
    assert_eq!(normalize("\u{0}\u{1} 🎉 ✨ • "), "");
}

// ============================================================
// Idempotence
// ============================================================

#[test]
fn normalized_posts_are_fixed_points() {
    let posts = [
        "Thrilled 🎉 to share that I've joined *Acme* as a __Senior__ Engineer!\n\nhashtag #newjob",
        "• Point one\n• Point two\n\n~~old~~ `new`",
        "Q3 results: revenue ≥ $2M, margin ± 3% \u{2014} details below 👇",
        "Line one\u{2028}Line two\u{2029}Line three\u{85}end",
        "",
    ];
    for post in posts {
        let once = normalize(post);
        assert_eq!(normalize(&once), once, "not a fixed point: {post:?}");
    }
}
