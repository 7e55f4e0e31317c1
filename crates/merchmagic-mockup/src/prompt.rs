//! Prompt construction for create and edit requests.

use merchmagic_core::models::mockup::ProductType;

pub const DEFAULT_COLOR: &str = "white";

pub fn create_prompt(product: ProductType, color: Option<&str>, extra: Option<&str>) -> String {
    let product = product.as_str();
    let color = color
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .unwrap_or(DEFAULT_COLOR);

    let mut prompt = format!(
        "Create a high-quality, professional product mockup of a {color} {product}. \
         The uploaded image is a logo. Please place this logo naturally on the {product}. \
         Ensure the lighting, shadows, and texture of the logo match the fabric or material \
         of the {product}. The background should be a clean, minimalist studio setting or a \
         lifestyle context appropriate for {product}."
    );
    if let Some(extra) = extra.map(str::trim).filter(|e| !e.is_empty()) {
        prompt.push_str(" Additional instructions: ");
        prompt.push_str(extra);
    }
    prompt
}

pub fn edit_prompt(instruction: &str) -> String {
    format!(
        "Here is a current mockup and the original logo. Please modify the mockup according \
         to this instruction: \"{}\". Maintain the logo placement but apply the requested \
         changes (e.g., change product color, change background, add a filter).",
        instruction.trim()
    )
}
