//! Rendering of command results.

use live_status::{Platform, ProbeResult};
use serde_json::json;

use crate::Result;
use crate::cli::OutputFormat;
use crate::models::Creator;
use crate::monitor::RefreshSummary;

pub fn format_probe(
    platform: Platform,
    username: &str,
    result: &ProbeResult,
    format: OutputFormat,
) -> Result<String> {
    match format {
        OutputFormat::Pretty => {
            let mut output = format!("{platform}/{username}: {}", result.signal);
            if let Some(evidence) = &result.evidence {
                output.push_str(&format!(" ({evidence})"));
            }
            Ok(output)
        }
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&json!({
            "status": "ok",
            "platform": platform,
            "username": username,
            "signal": result.signal,
            "evidence": result.evidence,
        }))?),
    }
}

pub fn format_refresh(
    creators: &[Creator],
    summary: &RefreshSummary,
    format: OutputFormat,
) -> Result<String> {
    match format {
        OutputFormat::Pretty => {
            let mut output = String::new();
            for creator in creators {
                let marker = if creator.is_live() { "LIVE" } else { "    " };
                output.push_str(&format!("{marker} {} [{}]\n", creator.name, creator.id));
                for account in &creator.accounts {
                    output.push_str(&format!(
                        "       {:<9} {:<24} {}\n",
                        account.platform.as_str(),
                        account.username,
                        account.live_status.unwrap_or_default()
                    ));
                }
            }
            output.push_str(&summary.to_string());
            Ok(output)
        }
        OutputFormat::Json => {
            let creators: Vec<_> = creators
                .iter()
                .map(|c| {
                    json!({
                        "id": c.id,
                        "name": c.name,
                        "isLive": c.is_live(),
                        "accounts": c.accounts.iter().map(|a| json!({
                            "platform": a.platform,
                            "username": a.username,
                            "liveStatus": a.live_status.unwrap_or_default(),
                        })).collect::<Vec<_>>(),
                    })
                })
                .collect();
            Ok(serde_json::to_string_pretty(&json!({
                "status": "ok",
                "summary": summary,
                "creators": creators,
            }))?)
        }
    }
}

#[cfg(test)]
mod tests {
    use live_status::LiveSignal;

    use super::*;
    use crate::models::SocialAccount;

    #[test]
    fn test_format_probe() {
        let result = ProbeResult::live("4h32m");
        assert_eq!(
            format_probe(Platform::Twitch, "xqc", &result, OutputFormat::Pretty).unwrap(),
            "twitch/xqc: live (4h32m)"
        );

        let json = format_probe(Platform::Kick, "x", &ProbeResult::unknown(), OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["signal"], "unknown");
        assert_eq!(value["platform"], "kick");
        assert!(value["evidence"].is_null());
    }

    #[test]
    fn test_format_refresh_json() {
        let creators = vec![Creator::new("Someone").with_account(
            SocialAccount::new(Platform::Youtube, "someone").with_live_status(LiveSignal::Live),
        )];
        let summary = RefreshSummary::from_creators(&creators);
        let json = format_refresh(&creators, &summary, OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["summary"]["live"], 1);
        assert_eq!(value["creators"][0]["isLive"], true);
        assert_eq!(value["creators"][0]["accounts"][0]["liveStatus"], "live");
    }
}
