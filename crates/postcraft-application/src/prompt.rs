//! Instruction template for the caption/hashtag step.

use minijinja::{Environment, context};
use postcraft_core::error::{PostcraftError, Result};
use postcraft_core::PostRequest;

pub const SYSTEM_INSTRUCTION: &str = "You are a social media post generator.";

const POST_PROMPT_NAME: &str = "post_prompt";

const POST_PROMPT_TEMPLATE: &str = r#"Create a social media post for {{ platform }} ({{ format_label }}) with a {{ tone }} tone.

Post description: {{ description }}

{% if hashtag_count -%}
Include {{ hashtag_count }} hashtags in the post. The hashtags should be relevant to the post and should not include the # symbol.
{%- else -%}
Do not include hashtags in the post.
{%- endif %}

DON'T INCLUDE HASHTAGS IN THE CAPTION.

The image description should be in english."#;

/// Renders the user instruction for `request`.
///
/// The description is embedded verbatim.
pub fn render_instruction(request: &PostRequest) -> Result<String> {
    let mut env = Environment::new();
    env.add_template(POST_PROMPT_NAME, POST_PROMPT_TEMPLATE)
        .map_err(|e| PostcraftError::internal(format!("invalid prompt template: {e}")))?;

    let template = env
        .get_template(POST_PROMPT_NAME)
        .map_err(|e| PostcraftError::internal(e.to_string()))?;

    template
        .render(context! {
            platform => request.platform().to_string(),
            format_label => request.template().label,
            tone => request.tone().to_string(),
            description => request.description(),
            hashtag_count => request.requested_hashtags().map(|count| count.get()),
        })
        .map_err(|e| PostcraftError::internal(format!("failed to render prompt: {e}")))
}
