//! Turns UI descriptions into serenity builders.

use serenity::all::{
    ButtonStyle, CreateActionRow, CreateButton, CreateEmbed, CreateEmbedFooter, CreateInputText,
    CreateMessage, CreateModal, CreateSelectMenu, CreateSelectMenuKind, CreateSelectMenuOption,
    EditMessage, InputTextStyle, ReactionType,
};
use tracing::warn;

use super::config::{
    ButtonConfig, ComponentConfig, EmbedConfig, InputStyle, ModalConfig, SelectConfig, UiElement,
};

/// Discord limits.
pub const MAX_BUTTONS_PER_ROW: usize = 5;
pub const MAX_ROWS: usize = 5;
pub const MAX_SELECT_OPTIONS: usize = 25;
pub const MAX_EMBEDS: usize = 10;

/// Field names and values may not be empty.
const BLANK: &str = "\u{200b}";

/// Maps a configured style code. Unknown codes fall back to primary.
pub fn button_style(code: u8) -> ButtonStyle {
    match code {
        1 => ButtonStyle::Primary,
        2 => ButtonStyle::Secondary,
        3 => ButtonStyle::Success,
        4 => ButtonStyle::Danger,
        _ => ButtonStyle::Primary,
    }
}

/// How components are grouped into action rows.
#[derive(Debug, PartialEq)]
pub enum RowLayout<'a> {
    Buttons(Vec<&'a ButtonConfig>),
    Select(&'a SelectConfig),
}

fn is_renderable_button(button: &ButtonConfig) -> bool {
    button.custom_id.is_some() || button.url.is_some()
}

fn is_renderable_select(select: &SelectConfig) -> bool {
    !select.custom_id.is_empty() && !select.options.is_empty()
}

/// Groups consecutive buttons (five per row) and gives each select its own row.
pub fn layout_rows(components: &[ComponentConfig]) -> Vec<RowLayout<'_>> {
    let mut rows = Vec::new();
    let mut buttons: Vec<&ButtonConfig> = Vec::new();

    for component in components {
        match component {
            ComponentConfig::Button(button) if is_renderable_button(button) => {
                buttons.push(button);
                if buttons.len() == MAX_BUTTONS_PER_ROW {
                    rows.push(RowLayout::Buttons(std::mem::take(&mut buttons)));
                }
            }
            ComponentConfig::Select(select) if is_renderable_select(select) => {
                if !buttons.is_empty() {
                    rows.push(RowLayout::Buttons(std::mem::take(&mut buttons)));
                }
                rows.push(RowLayout::Select(select));
            }
            other => warn!("Skipping component without id or content: {:?}", other),
        }
    }
    if !buttons.is_empty() {
        rows.push(RowLayout::Buttons(buttons));
    }

    if rows.len() > MAX_ROWS {
        warn!(
            "{} component rows configured, only the first {} are sent",
            rows.len(),
            MAX_ROWS
        );
        rows.truncate(MAX_ROWS);
    }
    rows
}

pub fn build_button(config: &ButtonConfig) -> Option<CreateButton> {
    let button = match (&config.custom_id, &config.url) {
        (_, Some(url)) if config.style == 5 || config.custom_id.is_none() => {
            CreateButton::new_link(url)
        }
        (Some(custom_id), _) => CreateButton::new(custom_id).style(button_style(config.style)),
        (None, Some(url)) => CreateButton::new_link(url),
        (None, None) => return None,
    };

    let button = match &config.label {
        Some(label) => button.label(label),
        None => button,
    };
    let button = match &config.emoji {
        Some(emoji) => button.emoji(ReactionType::Unicode(emoji.clone())),
        None => button,
    };
    Some(button.disabled(config.disabled))
}

pub fn build_select(config: &SelectConfig) -> CreateSelectMenu {
    let options: Vec<CreateSelectMenuOption> = config
        .options
        .iter()
        .take(MAX_SELECT_OPTIONS)
        .map(|option| {
            let mut built = CreateSelectMenuOption::new(&option.label, &option.value)
                .default_selection(option.default);
            if let Some(description) = &option.description {
                built = built.description(description);
            }
            if let Some(emoji) = &option.emoji {
                built = built.emoji(ReactionType::Unicode(emoji.clone()));
            }
            built
        })
        .collect();
    let option_count = options.len() as u8;

    let mut menu = CreateSelectMenu::new(&config.custom_id, CreateSelectMenuKind::String { options })
        .disabled(config.disabled);
    if let Some(placeholder) = &config.placeholder {
        menu = menu.placeholder(placeholder);
    }
    if let Some(min) = config.min_values {
        menu = menu.min_values(min.min(option_count));
    }
    if let Some(max) = config.max_values {
        menu = menu.max_values(max.clamp(1, option_count.max(1)));
    }
    menu
}

pub fn build_components(components: &[ComponentConfig]) -> Vec<CreateActionRow> {
    layout_rows(components)
        .into_iter()
        .map(|row| match row {
            RowLayout::Buttons(buttons) => {
                CreateActionRow::Buttons(buttons.into_iter().filter_map(build_button).collect())
            }
            RowLayout::Select(select) => CreateActionRow::SelectMenu(build_select(select)),
        })
        .collect()
}

fn non_blank(text: &str) -> &str {
    if text.trim().is_empty() { BLANK } else { text }
}

pub fn build_embed(config: &EmbedConfig) -> CreateEmbed {
    let mut embed = CreateEmbed::new().color(config.color);

    if let Some(title) = &config.title {
        embed = embed.title(title);
    }
    if let Some(description) = &config.description {
        embed = embed.description(description);
    }
    if let Some(url) = &config.url {
        embed = embed.url(url);
    }
    if let Some(footer) = &config.footer {
        embed = embed.footer(CreateEmbedFooter::new(footer));
    }
    if let Some(thumbnail) = &config.thumbnail {
        embed = embed.thumbnail(thumbnail);
    }
    if let Some(image) = &config.image {
        embed = embed.image(image);
    }

    embed.fields(
        config
            .fields
            .iter()
            .map(|field| (non_blank(&field.name), non_blank(&field.value), field.inline)),
    )
}

pub fn build_modal(config: &ModalConfig) -> CreateModal {
    let rows = config
        .fields
        .iter()
        .take(MAX_ROWS)
        .map(|field| {
            let style = match field.style {
                InputStyle::Short => InputTextStyle::Short,
                InputStyle::Paragraph => InputTextStyle::Paragraph,
            };
            let mut input =
                CreateInputText::new(style, &field.label, &field.custom_id).required(field.required);
            if let Some(placeholder) = &field.placeholder {
                input = input.placeholder(placeholder);
            }
            if let Some(min) = field.min_length {
                input = input.min_length(min);
            }
            if let Some(max) = field.max_length {
                input = input.max_length(max);
            }
            CreateActionRow::InputText(input)
        })
        .collect();

    CreateModal::new(&config.custom_id, &config.title).components(rows)
}

/// The embeds and components of one element, ready to send or edit into a message.
#[derive(Debug, Clone, Default)]
pub struct RenderedElement {
    pub embeds: Vec<CreateEmbed>,
    pub components: Vec<CreateActionRow>,
}

impl RenderedElement {
    pub fn render(element: &UiElement) -> Self {
        if element.embeds.len() > MAX_EMBEDS {
            warn!(
                "{} embeds configured, only the first {} are sent",
                element.embeds.len(),
                MAX_EMBEDS
            );
        }
        Self {
            embeds: element
                .embeds
                .iter()
                .take(MAX_EMBEDS)
                .map(build_embed)
                .collect(),
            components: build_components(&element.components),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.embeds.is_empty() && self.components.is_empty()
    }

    pub fn to_message(&self) -> CreateMessage {
        CreateMessage::new()
            .embeds(self.embeds.clone())
            .components(self.components.clone())
    }

    pub fn to_edit(&self) -> EditMessage {
        EditMessage::new()
            .embeds(self.embeds.clone())
            .components(self.components.clone())
    }
}
