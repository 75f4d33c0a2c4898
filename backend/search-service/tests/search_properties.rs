//! Hashtag extraction and query composition invariants
use once_cell::sync::Lazy;
use regex::Regex;
use search_service::hashtags::extract_hashtags;
use search_service::services::search::{
    hashtags_query, normalize_tag_query, per_type_size, posts_query, users_query,
};

static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\w+$").unwrap());

#[test]
fn extracted_hashtags_are_lowercase_word_tokens() {
    let samples = [
        "Dia de #Praia com a #FAMÍLIA toda! #praia",
        "#rust #Rust #RUST",
        "nada aqui",
        "#a #b2 #_c #123",
        "pontuação: #fim. #fim, (#fim)",
    ];

    for content in samples {
        for tag in extract_hashtags(content) {
            assert_eq!(tag, tag.to_lowercase(), "tag not lowercased: {tag}");
            assert!(WORD.is_match(&tag), "tag not \\w+: {tag}");
        }
    }
}

#[test]
fn extraction_deduplicates_case_variants() {
    let tags = extract_hashtags("#rust #Rust #RUST");
    assert_eq!(tags, vec!["rust"]);
}

#[test]
fn every_per_type_query_paginates_from_its_offset() {
    for (page, page_size) in [(1, 20), (2, 20), (5, 10)] {
        let from = (page - 1) * page_size;
        for body in [
            posts_query("query", from, page_size),
            users_query("query", from, page_size),
            hashtags_query("query", from, page_size),
        ] {
            assert_eq!(body["from"], from);
            assert_eq!(body["size"], page_size);
            assert_eq!(body["query"]["bool"]["minimum_should_match"], 1);
            assert_eq!(body["sort"][0]["_score"]["order"], "desc");
        }
    }
}

#[test]
fn fuzzy_clauses_use_auto_fuzziness() {
    let posts = posts_query("experiance", 0, 20);
    assert_eq!(posts["query"]["bool"]["should"][1]["match"]["content"]["fuzziness"], "AUTO");

    let users = users_query("maira", 0, 20);
    assert_eq!(users["query"]["bool"]["should"][1]["match"]["name"]["fuzziness"], "AUTO");

    let hashtags = hashtags_query("carnval", 0, 20);
    assert_eq!(hashtags["query"]["bool"]["should"][1]["fuzzy"]["tag"]["fuzziness"], "AUTO");
}

#[test]
fn hashtag_lookups_normalize_the_user_query() {
    assert_eq!(normalize_tag_query("#Experiência"), "experiência");
    let body = posts_query("#Carnaval", 0, 20);
    assert_eq!(body["query"]["bool"]["should"][2]["term"]["hashtags"]["value"], "carnaval");
}

#[test]
fn all_types_split_always_covers_the_page() {
    for page_size in 1..=100 {
        let share = per_type_size(page_size);
        assert!(share >= 1);
        assert!(share * 3 >= page_size, "3 × {share} < {page_size}");
    }
}
