use super::fakes::{FakeGenerator, FakeProvider};
use crate::types::ResearchReport;
use crate::Researcher;
use delve_core::{AppError, ResearchConfig};
use delve_search::{RawDocument, SearchCache};
use serde_json::json;
use std::sync::Arc;
use tempfile::TempDir;

fn config() -> ResearchConfig {
    ResearchConfig {
        max_queries_per_cycle: 3,
        max_sources: 5,
        refinement_budget: 2,
        use_cache: false,
        ..Default::default()
    }
}

fn summaries() -> Arc<FakeGenerator> {
    Arc::new(FakeGenerator::new(vec![]).with_text(|_| "condensed".to_string()))
}

fn scenario_provider() -> FakeProvider {
    FakeProvider::default()
        .with(
            "X",
            vec![
                RawDocument::new("X overview", "https://x.test/overview", "what X is"),
                RawDocument::new("X history", "https://x.test/history", "where X came from"),
            ],
        )
        .with(
            "X details",
            vec![RawDocument::new("X overview (mirror)", "https://x.test/overview", "same page")],
        )
}

#[tokio::test]
async fn test_full_research_run() {
    let generator = Arc::new(FakeGenerator::new(vec![
        json!({"queries": ["X", "X details"]}),
        json!({"queries": []}),
        json!({"sources": [2, 1]}),
    ]));
    let provider = Arc::new(scenario_provider());

    let researcher = Researcher::new(generator.clone(), provider.clone(), config())
        .with_summarizer(summaries());
    let report = researcher.run_research("X").await.unwrap();

    // Three raw hits, one duplicate URL
    assert_eq!(provider.calls(), vec!["X", "X details"]);
    let filter_prompt = &generator.structured_prompts()[2];
    assert!(filter_prompt.contains("[1] X overview\n"));
    assert!(filter_prompt.contains("[2] X history\n"));
    assert!(!filter_prompt.contains("[3]"));

    // Filter order wins
    let titles: Vec<&str> = report.sources.iter().map(|s| s.title.as_str()).collect();
    assert_eq!(titles, vec!["X history", "X overview"]);
    assert_eq!(report.sources[0].index, 1);

    // The echoed report saw both sources, reordered
    assert!(report.report.contains("[1] X history"));
    assert!(report.report.contains("[2] X overview"));
    assert!(report.report.contains("condensed"));

    assert_eq!(report.queries, vec!["X", "X details"]);
    assert_eq!(report.refinement_cycles, 0);
    assert_eq!(report.feedback_rounds, 0);
}

#[tokio::test]
async fn test_empty_plan_reports_no_information() {
    let generator = Arc::new(FakeGenerator::new(vec![json!({"queries": []})]));
    let provider = Arc::new(FakeProvider::default());

    let report = Researcher::new(generator.clone(), provider.clone(), config())
        .run_research("nothing")
        .await
        .unwrap();

    assert_eq!(report, ResearchReport::no_information("nothing"));
    assert!(provider.calls().is_empty());
    assert!(generator.text_prompts().is_empty());
}

#[tokio::test]
async fn test_no_results_reports_no_information() {
    let generator = Arc::new(FakeGenerator::new(vec![
        json!({"queries": ["void"]}),
        json!({"queries": []}),
    ]));
    let provider = Arc::new(FakeProvider::default().with("void", vec![]));

    let report = Researcher::new(generator.clone(), provider, config())
        .run_research("void")
        .await
        .unwrap();

    assert!(!report.has_sources());
    assert_eq!(report.queries, vec!["void"]);
    // No filter call, no synthesis
    assert_eq!(generator.structured_prompts().len(), 2);
    assert!(generator.text_prompts().is_empty());
}

#[tokio::test]
async fn test_filter_selecting_nothing_keeps_leading_results() {
    let generator = Arc::new(FakeGenerator::new(vec![
        json!({"queries": ["X"]}),
        json!({"queries": []}),
        json!({"sources": [0, 99]}),
    ]));

    let report = Researcher::new(generator, Arc::new(scenario_provider()), config())
        .with_summarizer(summaries())
        .run_research("X")
        .await
        .unwrap();

    let titles: Vec<&str> = report.sources.iter().map(|s| s.title.as_str()).collect();
    assert_eq!(titles, vec!["X overview", "X history"]);
}

#[tokio::test]
async fn test_search_failure_fails_the_run() {
    let generator = Arc::new(FakeGenerator::new(vec![json!({"queries": ["X", "broken"]})]));
    let provider = Arc::new(scenario_provider().failing_on("broken"));

    let err = Researcher::new(generator, provider, config())
        .with_summarizer(summaries())
        .run_research("X")
        .await
        .unwrap_err();

    assert!(err.to_string().contains("broken"));
    assert!(matches!(err, AppError::Search { .. }));
}

#[tokio::test]
async fn test_invalid_config_is_rejected() {
    let generator = Arc::new(FakeGenerator::new(vec![]));
    let bad = ResearchConfig {
        max_sources: 0,
        ..config()
    };

    let err = Researcher::new(generator, Arc::new(FakeProvider::default()), bad)
        .run_research("X")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Config(_)));
}

#[tokio::test]
async fn test_second_run_is_served_from_cache() {
    let temp = TempDir::new().unwrap();
    let script = || {
        vec![
            json!({"queries": ["X"]}),
            json!({"queries": []}),
            json!({"sources": [1]}),
        ]
    };
    let provider = Arc::new(scenario_provider());

    for _ in 0..2 {
        let researcher = Researcher::new(Arc::new(FakeGenerator::new(script())), provider.clone(), config())
            .with_summarizer(summaries())
            .with_cache(SearchCache::new(temp.path()));
        let report = researcher.run_research("X").await.unwrap();
        assert_eq!(report.sources.len(), 1);
    }

    assert_eq!(provider.calls(), vec!["X"]);
}

#[tokio::test]
async fn test_cache_follows_config() {
    let temp = TempDir::new().unwrap();
    let script = || {
        vec![
            json!({"queries": ["X"]}),
            json!({"queries": []}),
            json!({"sources": [1]}),
        ]
    };
    let cached = ResearchConfig {
        use_cache: true,
        cache_directory: Some(temp.path().to_path_buf()),
        ..config()
    };
    let provider = Arc::new(scenario_provider());

    for _ in 0..2 {
        Researcher::new(Arc::new(FakeGenerator::new(script())), provider.clone(), cached.clone())
            .with_summarizer(summaries())
            .run_research("X")
            .await
            .unwrap();
    }

    assert_eq!(provider.calls(), vec!["X"]);
    assert_eq!(SearchCache::new(temp.path()).stats().await.unwrap().entries, 1);
}
