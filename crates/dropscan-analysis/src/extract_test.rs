use dropscan_core::Recommendation;

use super::*;

const RAW: &str = r#"{"actualFullName":"Portable Neck Fan","viabilityScore":72,"recommendation":"dropship","topRisks":["Seasonal demand","Low barrier to entry"],"suggestions":["Bundle with a carry case"],"reasoning":"Strong summer demand."}"#;

#[test]
fn raw_object_parses_directly() {
    let r = parse_analysis(RAW, "neck fan").unwrap();
    assert_eq!(r.actual_full_name, "Portable Neck Fan");
    assert_eq!(r.viability_score, 72);
    assert_eq!(r.recommendation, Recommendation::Dropship);
    assert_eq!(r.top_risks.len(), 2);
}

#[test]
fn fenced_object_in_prose_matches_raw_object() {
    let wrapped = format!("Here is the result: ```json\n{RAW}\n``` Thanks!");
    assert_eq!(
        parse_analysis(&wrapped, "neck fan").unwrap(),
        parse_analysis(RAW, "neck fan").unwrap()
    );
}

#[test]
fn braces_inside_strings_do_not_end_the_span() {
    let text = r#"Sure! {"reasoning":"uses } and { in text \" quoted","recommendation":"skip","viabilityScore":"40"} trailing {"#;
    let span = first_balanced_object(text).unwrap();
    assert!(span.starts_with('{') && span.ends_with('}'));
    let r = parse_analysis(text, "x").unwrap();
    assert_eq!(r.recommendation, Recommendation::Skip);
    assert_eq!(r.viability_score, 40);
}

#[test]
fn nested_objects_are_kept_whole() {
    let text = r#"result: {"recommendation":"white label","viabilityScore":55,"meta":{"a":{"b":1}}} done"#;
    let r = parse_analysis(text, "Phone Stand").unwrap();
    assert_eq!(r.recommendation, Recommendation::WhiteLabel);
    assert_eq!(r.actual_full_name, "Phone Stand");
}

#[test]
fn no_braces_is_unparsable() {
    let err = parse_analysis("I cannot help with that.", "x").unwrap_err();
    assert!(matches!(err, ProviderError::Unparsable(_)));
}

#[test]
fn unbalanced_braces_are_unparsable() {
    assert!(first_balanced_object("{\"a\": {\"b\": 1}").is_none());
    assert!(matches!(
        parse_analysis("{\"recommendation\": \"skip\"", "x"),
        Err(ProviderError::Unparsable(_))
    ));
}

#[test]
fn unknown_recommendation_is_invalid() {
    let err = parse_analysis(r#"{"recommendation":"maybe","viabilityScore":50}"#, "x").unwrap_err();
    assert!(matches!(err, ProviderError::Invalid(_)));
}

#[test]
fn missing_score_is_invalid() {
    let err = parse_analysis(r#"{"recommendation":"skip"}"#, "x").unwrap_err();
    assert!(matches!(err, ProviderError::Invalid(_)));
}

#[test]
fn scores_are_clamped_and_percent_strings_accepted() {
    let high = parse_analysis(r#"{"recommendation":"skip","viabilityScore":140}"#, "x").unwrap();
    assert_eq!(high.viability_score, 100);
    let pct = parse_analysis(r#"{"recommendation":"skip","viabilityScore":"64.6%"}"#, "x").unwrap();
    assert_eq!(pct.viability_score, 65);
}

#[test]
fn single_string_lists_are_wrapped() {
    let r = parse_analysis(
        r#"{"recommendation":"dropship","viabilityScore":80,"topRisks":"Copycats","suggestions":[" ", "Test ads"]}"#,
        "x",
    )
    .unwrap();
    assert_eq!(r.top_risks, vec!["Copycats".to_string()]);
    assert_eq!(r.suggestions, vec!["Test ads".to_string()]);
    assert_eq!(r.reasoning, "");
}
