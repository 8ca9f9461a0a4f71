//! Prompt assembly.
//!
//! Every analysis request has the same shape: a system instruction, a task
//! description, one data block, and the step-by-step instructions. Count
//! tables are embedded as JSON objects so label order survives.

use super::ChatMessage;
use crate::error::Result;
use crate::stats::ReleaseTables;
use indexmap::IndexMap;

const STEPS: &str = "\
To proceed with the analysis, follow these steps:

1. **Step-by-Step Comparison**: Break down the issues and compare their frequencies. Calculate percentage changes where applicable. Don't print this info.

2. **Trend Identification**: Look for any significant increases or decreases in issues. Determine if there are emerging patterns or persistent problems.

3. **Concerns and Improvements**: Highlight any categories that have worsened or improved significantly. Assess if there are any issues that need urgent attention.

4. **Recommendations**: Based on your findings, provide detailed recommendations to improve the quality of future releases. Prioritize areas with the most significant changes or potential impact.

Take your time to analyze the data thoroughly and provide a comprehensive response. Focus on the latest release. Reply using markdown syntax.";

const COMMENTS_TASK: &str = "\
The format is \"**issue id:** [comments from users]\". Please analyze the comments' mood. If the user is upset, the comment is negative. If the user talks about the problem without negative emotions, the comment is neutral.

Create a markdown table with the results of the analysis: how many issues are positive, negative and neutral, the common theme, and the reason for the selected mood. Show only the table in the reply.";

fn system(product: &str) -> ChatMessage {
    ChatMessage::system(format!(
        "You are an expert Quality Assurance Specialist with extensive knowledge of {product}'s functionality, release cycles, and quality metrics. Your task is to analyze the data about the recent {product} releases and draw conclusions about quality."
    ))
}

fn task(product: &str) -> ChatMessage {
    ChatMessage::user(format!(
        "I need your expertise to analyze the quality of {product}'s latest release. Specifically, I would like you to:

1. Identify Significant Trends or Changes: Highlight any notable trends, increases, or decreases in issues between releases.

2. Highlight Areas of Concern or Improvement: Identify any areas that have shown significant changes or may indicate potential areas for improvement.

3. Provide Actionable Recommendations: Based on your analysis, offer practical recommendations to address any identified issues or trends.

4. Provide conclusions about the quality of the latest release."
    ))
}

/// `**release:**` followed by its counts as a fenced JSON object, per release.
fn release_blocks(tables: &ReleaseTables) -> Result<String> {
    let mut blocks = Vec::with_capacity(tables.len());
    for (release, counts) in tables {
        blocks.push(format!("**{release}:**\n```{}```", serde_json::to_string(counts)?));
    }
    Ok(blocks.join("\n\n"))
}

/// Created and fixed tables for the team's issues in each release.
///
/// # Errors
///
/// Returns an error if a table cannot be serialized.
pub fn release_comparison(
    product: &str,
    created: &ReleaseTables,
    fixed: &ReleaseTables,
) -> Result<Vec<ChatMessage>> {
    let data = format!(
        "Amount of issues found by {product}'s QAs of each type in each release:\n\n{}\n\nAmount of issues (found by {product}'s QAs) which were fixed by developers in each release:\n\n{}",
        release_blocks(created)?,
        release_blocks(fixed)?
    );
    Ok(vec![
        system(product),
        task(product),
        ChatMessage::user(data),
        ChatMessage::user(STEPS),
    ])
}

/// One distribution per release, introduced by `description`.
///
/// # Errors
///
/// Returns an error if a table cannot be serialized.
pub fn distribution(
    product: &str,
    description: &str,
    tables: &ReleaseTables,
) -> Result<Vec<ChatMessage>> {
    let data = format!(
        "Here is the data for the analysis. It shows {description}:\n\n{}",
        release_blocks(tables)?
    );
    Ok(vec![
        system(product),
        task(product),
        ChatMessage::user(data),
        ChatMessage::user(STEPS),
    ])
}

/// Mood analysis of user comments grouped by issue id.
///
/// # Errors
///
/// Returns an error if a comment list cannot be serialized.
pub fn comments(
    product: &str,
    grouped: &IndexMap<String, Vec<String>>,
) -> Result<Vec<ChatMessage>> {
    let mut data = format!(
        "I have the following data about comments from users in the {product} bug tracker:\n\n"
    );
    for (id, texts) in grouped {
        data.push_str(&format!("**{id}:** `{}`\n", serde_json::to_string(texts)?));
    }
    Ok(vec![
        system(product),
        ChatMessage::user(data),
        ChatMessage::user(COMMENTS_TASK),
    ])
}

/// Merge partial comment analyses into one table.
#[must_use]
pub fn combine_comments(product: &str, partials: &[String]) -> Vec<ChatMessage> {
    let data = format!(
        "Please combine the results of the analysis in one table by summing counts by mood and specifying the common theme:\n\n{}",
        partials.join("\n\n")
    );
    vec![system(product), ChatMessage::user(data)]
}
