//! Instruction text for every model call in a research session.
//!
//! Pure formatting; nothing here makes decisions.

use crate::research::researcher::{THINK_TOOL, WEB_SEARCH_TOOL};
use crate::research::supervisor::{CONDUCT_RESEARCH_TOOL, RESEARCH_COMPLETE_TOOL};

/// Today's date in the form the prompts use, e.g. "Mon Oct 19, 2026"
pub fn today() -> String {
    chrono::Local::now().format("%a %b %-d, %Y").to_string()
}

pub fn clarify_with_user_instructions(transcript: &str, date: &str) -> String {
    format!(
        r#"These are the messages exchanged so far with the user asking for a research report:
<Messages>
{transcript}
</Messages>

Today's date is {date}.

Decide whether you need to ask the user one clarifying question before starting, or
whether there is enough to begin researching.

If an earlier message already asked a clarifying question, do not ask another one unless
it is strictly necessary. Ask only when there is an acronym, abbreviation or term you do
not know, or when the scope is genuinely ambiguous.

Respond with these fields:
- "need_clarification": true or false
- "question": the question to ask, if one is needed
- "verification": if no question is needed, a short message telling the user you will
  start researching now, restating what you understood

When you ask a question, keep it concise and use bullet points or a numbered list if it
helps. When you do not ask, "question" must be an empty string."#
    )
}

pub fn research_brief_prompt(transcript: &str, date: &str) -> String {
    format!(
        r#"You will be given the messages exchanged so far between you and the user. Turn them into
a detailed, concrete research brief that will steer the research.

<Messages>
{transcript}
</Messages>

Today's date is {date}.

Write one research question in the first person, from the user's side:
1. Include every detail and preference the user stated.
2. Where a dimension matters but the user left it open, say it is open-ended rather than
   inventing a constraint.
3. Do not assume facts the user did not give you.
4. Name preferred source types when the user implied them (official sites, primary papers,
   original-language sources for regional topics).

Respond with a single field "research_brief"."#
    )
}

pub fn lead_researcher_prompt(date: &str, max_concurrent: usize, max_iterations: usize) -> String {
    format!(
        r#"You are a research supervisor. Your job is to gather information for the research brief
in the first message by delegating to sub-agents with the "{CONDUCT_RESEARCH_TOOL}" tool.
Today's date is {date}.

<Tools>
1. **{CONDUCT_RESEARCH_TOOL}**: hand one self-contained topic to a research sub-agent
2. **{RESEARCH_COMPLETE_TOOL}**: call when the gathered findings are sufficient
3. **{THINK_TOOL}**: reflect and plan; never call it in the same turn as other tools
</Tools>

<Instructions>
- Start by reading the brief and deciding what information is needed.
- Launch parallel research only when sub-topics are clearly independent; a single
  sub-agent is usually right for simple questions.
- Use at most {max_concurrent} {CONDUCT_RESEARCH_TOOL} calls in one turn.
- Stop after {max_iterations} total rounds of delegation and reflection, even if some
  gaps remain.
- After each round of results, use {THINK_TOOL} to judge what was learned and what is
  still missing.
</Instructions>

<Delegation>
Sub-agents cannot see each other's work or this conversation. Every topic you delegate
must be a complete, standalone instruction with no acronyms left unexplained. Do not
delegate the writing of the final report.
</Delegation>"#
    )
}

pub fn research_system_prompt(date: &str) -> String {
    format!(
        r#"You are a research assistant investigating the topic given by the user. Today's date is {date}.

<Tools>
1. **{WEB_SEARCH_TOOL}**: run a web search for one query
2. **{THINK_TOOL}**: reflect after each search and plan the next step
</Tools>

<Instructions>
- Start broad, then narrow down to fill gaps.
- After every search, use {THINK_TOOL} to assess whether you can answer the question.
- Simple questions need 2-3 searches; complex ones at most 5.
- Stop when you can answer confidently, when the last two searches returned similar
  information, or when you are out of search budget. To stop, reply without calling
  any tool.
</Instructions>"#
    )
}

pub fn compress_research_system_prompt(date: &str) -> String {
    format!(
        r####"You are a research assistant who has gathered information through tool calls and web
searches. Clean up those findings without losing anything relevant. Today's date is {date}.

<Task>
- Keep every fact and statement the research gathered, verbatim where possible.
- Drop only duplicated or clearly irrelevant material.
- Cite sources inline with numbered references and finish with a "### Sources" list,
  one entry per URL, numbered sequentially without gaps.
</Task>

<Output Format>
**List of Queries and Tool Calls Made**
**Fully Comprehensive Findings**
**List of All Relevant Sources (with citations in the report)**
</Output Format>"####
    )
}

pub fn compress_research_human_message(topic: &str) -> String {
    format!(
        r#"All of the messages above are about research on this topic:

RESEARCH TOPIC: {topic}

Clean up the findings while keeping every statement relevant to the topic. Do not
summarize away details, and keep the source citations."#
    )
}

pub fn final_report_prompt(brief: &str, transcript: &str, findings: &str, date: &str) -> String {
    format!(
        r####"Write a comprehensive answer to the research brief using the findings below.

<Research Brief>
{brief}
</Research Brief>

<Messages>
{transcript}
</Messages>

Today's date is {date}.

<Findings>
{findings}
</Findings>

Guidelines:
- Answer in the same language as the user's messages.
- Use markdown headings (# title, ## sections); structure the report to fit the question
  (comparison, list, overview, or direct answer).
- Write in paragraphs, with bullet points only where they genuinely help.
- Do not refer to yourself or to the research process.
- Cite sources inline as [1], [2] and finish with a "### Sources" section listing every
  cited URL once, numbered sequentially."####
    )
}

pub fn summarize_webpage_prompt(webpage_content: &str, date: &str) -> String {
    format!(
        r#"Summarize the raw content of this web page, keeping what a researcher would need.

<webpage_content>
{webpage_content}
</webpage_content>

Today's date is {date}.

- Keep the main topic, key facts, statistics, dates, and any conclusions.
- Keep important quotes from credible sources verbatim.
- Aim for about a quarter of the original length unless the page is already concise.

Respond with two fields:
- "summary": the summary, as paragraphs or bullet points
- "key_excerpts": up to five important verbatim quotes, separated by newlines"#
    )
}
