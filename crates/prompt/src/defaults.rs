//! Built-in prompt definitions.
//!
//! Each entry is a YAML document in the same format as a workspace override
//! file, so copying one into `.delve/prompts/<id>.yml` is the way to customize it.

/// Query planning for a new topic.
pub const PLAN: &str = "research.plan";
/// Sufficiency check and follow-up queries.
pub const EVALUATE: &str = "research.evaluate";
/// Relevance ranking of gathered sources.
pub const FILTER: &str = "research.filter";
/// Final cited report.
pub const REPORT: &str = "research.report";
/// Per-document summary.
pub const SUMMARIZE: &str = "research.summarize";

const PLAN_YAML: &str = r#"
id: research.plan
title: Plan initial search queries
apiVersion: "1.0"
system: |
  You are a research planner. You break a topic into focused web search
  queries that together cover what a thorough report would need.
template: |
  Research topic:
  {{topic}}

  Propose at most {{max_queries}} distinct web search queries for this topic.
  Each query should target a different aspect. List them one per line.
"#;

const EVALUATE_YAML: &str = r#"
id: research.evaluate
title: Decide whether more searching is needed
apiVersion: "1.0"
system: |
  You review gathered research material and decide whether it is enough to
  write a thorough report. If it is not, you propose new searches.
template: |
  Research topic:
  {{topic}}

  Queries already issued:
  {{queries}}

  Material gathered so far:
  {{results}}

  If the material covers the topic well, say that no further queries are
  needed. Otherwise propose at most {{max_queries}} new search queries that
  fill the gaps. Do not repeat queries that were already issued.
"#;

const FILTER_YAML: &str = r#"
id: research.filter
title: Rank sources by relevance
apiVersion: "1.0"
system: |
  You judge how relevant numbered sources are to a research topic.
template: |
  Research topic:
  {{topic}}

  Sources:
  {{sources}}

  Pick at most {{max_sources}} sources that are most useful for a report on
  the topic. Give their numbers ordered from most to least relevant.
"#;

const REPORT_YAML: &str = r#"
id: research.report
title: Write the cited report
apiVersion: "1.0"
system: |
  You are a research writer. You write long-form markdown reports grounded
  only in the sources you are given, citing them inline as [n].
template: |
  Research topic:
  {{topic}}

  Sources:
  {{sources}}

  Write a detailed markdown report on the topic. Cite every claim with the
  number of the source it came from, like [1] or [2][3]. End with a
  "Sources" section listing each cited source as "[n] Title - Link".
"#;

const SUMMARIZE_YAML: &str = r#"
id: research.summarize
title: Summarize one fetched document
apiVersion: "1.0"
system: |
  You condense web pages into dense factual summaries for a researcher.
template: |
  The page below was found while searching for:
  {{query}}

  Title: {{title}}

  Content:
  {{text}}

  Summarize the facts on this page that matter for the search. Keep numbers,
  names and dates. Do not add information that is not on the page.
"#;

/// All built-in prompt ids.
pub const BUILTIN_IDS: [&str; 5] = [PLAN, EVALUATE, FILTER, REPORT, SUMMARIZE];

/// YAML source of a built-in prompt.
pub fn builtin_source(id: &str) -> Option<&'static str> {
    match id {
        PLAN => Some(PLAN_YAML),
        EVALUATE => Some(EVALUATE_YAML),
        FILTER => Some(FILTER_YAML),
        REPORT => Some(REPORT_YAML),
        SUMMARIZE => Some(SUMMARIZE_YAML),
        _ => None,
    }
}
