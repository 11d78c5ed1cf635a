//! Robots.txt policy evaluation
//!
//! Allow/disallow matching is delegated to the robotstxt crate; the
//! `Crawl-delay` extension is read here since the crate ignores it.

use robotstxt::DefaultMatcher;
use std::time::Duration;

/// The site's robots.txt, ready to answer permission questions
#[derive(Debug, Clone, Default)]
pub struct RobotsPolicy {
    /// Raw robots.txt body; `None` means everything is allowed
    content: Option<String>,
}

impl RobotsPolicy {
    /// Creates a policy from a robots.txt body
    pub fn from_content(content: &str) -> Self {
        Self {
            content: Some(content.to_string()),
        }
    }

    /// Creates a permissive policy, used when robots.txt is absent or unreachable
    pub fn allow_all() -> Self {
        Self { content: None }
    }

    /// Checks whether `url` may be fetched by `agent`
    ///
    /// `agent` is the crawler's product token (e.g. "FringeSift"), not the
    /// full user agent string.
    pub fn is_allowed(&self, url: &str, agent: &str) -> bool {
        match self.content.as_deref() {
            None => true,
            Some(body) if body.trim().is_empty() => true,
            Some(body) => {
                let mut matcher = DefaultMatcher::default();
                matcher.one_agent_allowed_by_robots(body, agent, url)
            }
        }
    }

    /// The `Crawl-delay` that applies to `agent`, if any
    ///
    /// A group naming the agent takes precedence over the `*` group.
    pub fn crawl_delay(&self, agent: &str) -> Option<Duration> {
        let body = self.content.as_deref()?;
        let agent = agent.to_lowercase();

        let mut group: Vec<String> = Vec::new();
        let mut group_has_rules = false;
        let mut specific = None;
        let mut wildcard = None;

        for line in body.lines() {
            let line = line.split('#').next().unwrap_or("").trim();
            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            let value = value.trim();

            match key.trim().to_lowercase().as_str() {
                "user-agent" => {
                    if group_has_rules {
                        group.clear();
                        group_has_rules = false;
                    }
                    group.push(value.to_lowercase());
                }
                "crawl-delay" => {
                    group_has_rules = true;
                    let Ok(seconds) = value.parse::<f64>() else {
                        continue;
                    };
                    if !seconds.is_finite() || seconds < 0.0 {
                        continue;
                    }
                    let delay = Duration::from_secs_f64(seconds);
                    if group.iter().any(|ua| ua != "*" && agent.contains(ua.as_str())) {
                        specific = Some(delay);
                    } else if group.iter().any(|ua| ua == "*") {
                        wildcard = Some(delay);
                    }
                }
                _ => group_has_rules = true,
            }
        }

        specific.or(wildcard)
    }
}
