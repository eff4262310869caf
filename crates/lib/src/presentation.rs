//! # Issue Grouping
//!
//! Orders articles the way the public pages list them.

use crate::types::Article;
use serde::Serialize;
use std::{cmp::Ordering, collections::BTreeMap};

#[derive(Debug, Clone, Serialize)]
pub struct IssueGroup {
    pub issue_number: u32,
    pub articles: Vec<Article>,
}

#[derive(Debug, Clone, Serialize)]
pub struct VolumeGroup {
    pub volume_number: u32,
    pub issues: Vec<IssueGroup>,
}

/// Groups articles by volume, then issue.
///
/// Volumes and issues run newest first. Inside an issue, articles follow their
/// `display_order` and then their title.
pub fn group_by_volume_issue(articles: Vec<Article>) -> Vec<VolumeGroup> {
    let mut volumes: BTreeMap<u32, BTreeMap<u32, Vec<Article>>> = BTreeMap::new();
    for article in articles {
        volumes
            .entry(article.volume_number)
            .or_default()
            .entry(article.issue_number)
            .or_default()
            .push(article);
    }

    volumes
        .into_iter()
        .rev()
        .map(|(volume_number, issues)| VolumeGroup {
            volume_number,
            issues: issues
                .into_iter()
                .rev()
                .map(|(issue_number, mut articles)| {
                    articles.sort_by(|a, b| {
                        a.display_order
                            .cmp(&b.display_order)
                            .then_with(|| a.title.cmp(&b.title))
                    });
                    IssueGroup {
                        issue_number,
                        articles,
                    }
                })
                .collect(),
        })
        .collect()
}

/// Sorts an author's articles: date descending (undated last), volume and issue
/// descending, then title ascending.
pub fn sort_for_author_page(articles: &mut [Article]) {
    articles.sort_by(|a, b| {
        let by_date = match (a.date, b.date) {
            (Some(x), Some(y)) => y.cmp(&x),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        by_date
            .then_with(|| b.volume_number.cmp(&a.volume_number))
            .then_with(|| b.issue_number.cmp(&a.issue_number))
            .then_with(|| a.title.cmp(&b.title))
    });
}
