//! Markup rendering
//!
//! Pure functions from gallery state to HTML fragments. All item text goes
//! through askama's HTML escaping; only fragments rendered here are
//! inserted with `|safe`.

use askama::Template;

use crate::error::Result;
use crate::state::data::{format_views, GalleryItem};
use crate::state::gallery::{Gallery, GalleryView, Selection};

use super::pagination::{PageSlot, Pagination};

const UNTITLED: &str = "Untitled";
const AVATAR_ALT: &str = "Author avatar";
const UNKNOWN_AUTHOR: &str = "Unknown";

pub const PROMPT_MESSAGE: &str = "Search the gallery to see matching images.";
pub const NO_MATCHES_MESSAGE: &str = "No images match your filters.";
pub const NO_PROMOTED_MESSAGE: &str = "No promoted items.";
pub const LOAD_ERROR_MESSAGE: &str = "Failed to load gallery.";
pub const NOT_FOUND_MESSAGE: &str = "Image not found.";

/// Small eye icon shared by cards and the detail view
const VIEWS_ICON: &str = r#"<svg class="views-icon" aria-hidden="true" xmlns="http://www.w3.org/2000/svg" width="24" height="24" fill="currentColor" viewBox="0 0 24 24"><path fill-rule="evenodd" d="M4.998 7.78C6.729 6.345 9.198 5 12 5c2.802 0 5.27 1.345 7.002 2.78a12.713 12.713 0 0 1 2.096 2.183c.253.344.465.682.618.997.14.286.284.658.284 1.04s-.145.754-.284 1.04a6.6 6.6 0 0 1-.618.997 12.712 12.712 0 0 1-2.096 2.183C17.271 17.655 14.802 19 12 19c-2.802 0-5.27-1.345-7.002-2.78a12.712 12.712 0 0 1-2.096-2.183 6.6 6.6 0 0 1-.618-.997C2.144 12.754 2 12.382 2 12s.145-.754.284-1.04c.153-.315.365-.653.618-.997A12.714 12.714 0 0 1 4.998 7.78ZM12 15a3 3 0 1 0 0-6 3 3 0 0 0 0 6Z" clip-rule="evenodd"/></svg>"#;

/// Display-ready fields of one item, defaults applied
struct ItemView<'a> {
    id: i64,
    title: &'a str,
    description: &'a str,
    src: &'a str,
    alt: &'a str,
    views: &'a str,
    views_display: String,
    author: &'a str,
    avatar: &'a str,
    avatar_alt: &'a str,
    icon: &'static str,
}

fn non_empty<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.trim().is_empty() {
        fallback
    } else {
        value
    }
}

impl<'a> ItemView<'a> {
    fn new(item: &'a GalleryItem) -> Self {
        let title = non_empty(&item.title, UNTITLED);
        let views = non_empty(&item.views, "0");
        Self {
            id: item.id,
            title,
            description: &item.description,
            src: &item.image.src,
            alt: non_empty(&item.image.alt, title),
            views,
            views_display: format_views(views),
            author: non_empty(&item.author.name, UNKNOWN_AUTHOR),
            avatar: &item.author.avatar,
            avatar_alt: non_empty(&item.author.alt, AVATAR_ALT),
            icon: VIEWS_ICON,
        }
    }
}

#[derive(Template)]
#[template(
    source = r#"<figure class="bento-item" data-id="{{ item.id }}" tabindex="0" aria-describedby="img-{{ item.id }}-title">
  <img src="{{ item.src }}" alt="{{ item.alt }}" loading="lazy" />
  <div class="ImgInfo">
    <h3 id="img-{{ item.id }}-title">{{ item.title }}</h3>
    <p>{{ item.description }}</p>
    <span class="views" aria-label="{{ item.views }} views">{{ item.views_display }} {{ item.icon|safe }}</span>
    <img src="{{ item.avatar }}" alt="{{ item.avatar_alt }}" />
  </div>
</figure>"#,
    ext = "html"
)]
struct CardTemplate<'a> {
    item: ItemView<'a>,
}

/// One entry of the pagination track
struct PageButton {
    label: String,
    page: usize,
    current: bool,
    ellipsis: bool,
}

impl From<PageSlot> for PageButton {
    fn from(slot: PageSlot) -> Self {
        match slot {
            PageSlot::Page { number, current } => PageButton {
                label: number.to_string(),
                page: number,
                current,
                ellipsis: false,
            },
            PageSlot::Ellipsis => PageButton {
                label: "...".to_string(),
                page: 0,
                current: false,
                ellipsis: true,
            },
        }
    }
}

#[derive(Template)]
#[template(
    source = r#"<nav class="gallery-pagination" role="navigation" aria-label="Gallery pagination">
  {% match prev %}{% when Some with (page) %}<button type="button" class="arrow prev" data-page="{{ page }}">Previous</button>{% when None %}<button type="button" class="arrow prev" disabled>Previous</button>{% endmatch %}
  <div class="numbers"><div class="numbers-track">
    {% for button in buttons %}{% if button.ellipsis %}<span class="ellipsis">{{ button.label }}</span>{% else if button.current %}<button type="button" class="page-btn" data-page="{{ button.page }}" disabled aria-current="page">{{ button.label }}</button>{% else %}<button type="button" class="page-btn" data-page="{{ button.page }}">{{ button.label }}</button>{% endif %}{% endfor %}
  </div></div>
  {% match next %}{% when Some with (page) %}<button type="button" class="arrow next" data-page="{{ page }}">Next</button>{% when None %}<button type="button" class="arrow next" disabled>Next</button>{% endmatch %}
</nav>"#,
    ext = "html"
)]
struct PaginationTemplate {
    prev: Option<usize>,
    next: Option<usize>,
    buttons: Vec<PageButton>,
}

#[derive(Template)]
#[template(
    source = r#"<p class="match-count" aria-live="polite">{{ match_label }}</p>
<section class="bento-gallery" aria-busy="false">
{% for card in cards %}{{ card|safe }}
{% endfor %}</section>
{{ pagination|safe }}"#,
    ext = "html"
)]
struct GridTemplate {
    match_label: String,
    cards: Vec<String>,
    pagination: String,
}

#[derive(Template)]
#[template(source = r#"<p class="{{ class }}">{{ message }}</p>"#, ext = "html")]
struct MessageTemplate<'a> {
    class: &'a str,
    message: &'a str,
}

#[derive(Template)]
#[template(
    source = r#"{% for item in items %}<article class="promoted-card" data-id="{{ item.id }}" tabindex="0" aria-label="Promoted: {{ item.title }}">
  <img class="main" src="{{ item.src }}" alt="{{ item.alt }}" loading="lazy" />
  <div class="pc-body">
    <h4><span class="badge-star">★</span>{{ item.title }}</h4>
    <p class="desc">{{ item.description }}</p>
    <div class="promoted-meta">
      <span class="views">{{ item.views_display }} {{ item.icon|safe }}</span>
      <img class="avatar" src="{{ item.avatar }}" alt="{{ item.avatar_alt }}">
    </div>
  </div>
</article>{% endfor %}"#,
    ext = "html"
)]
struct PromotedTemplate<'a> {
    items: Vec<ItemView<'a>>,
}

#[derive(Template)]
#[template(
    source = r#"<div class="selected-photo-wrapper">
  <img class="selected-photo" src="{{ item.src }}" alt="{{ item.alt }}" />
</div>
<div class="photo-meta">
  <header class="photo-meta-header">
    <h2 class="photo-title">{{ item.title }}</h2>
    <div class="photo-views" aria-label="{{ item.views }} views">{{ item.views_display }} {{ item.icon|safe }}</div>
  </header>
  <p class="photo-desc">{{ item.description }}</p>
  <div class="photo-author">
    <img src="{{ item.avatar }}" alt="{{ item.avatar_alt }}" class="author-avatar" />
    <span class="author-label">{{ item.author }}</span>
  </div>
  <div class="photo-nav">
    {% match prev %}{% when Some with (id) %}<button type="button" class="photo-prev" data-id="{{ id }}" aria-label="Previous image">Prev</button>{% when None %}<button type="button" class="photo-prev" aria-label="Previous image" disabled>Prev</button>{% endmatch %}
    {% match next %}{% when Some with (id) %}<button type="button" class="photo-next" data-id="{{ id }}" aria-label="Next image">Next</button>{% when None %}<button type="button" class="photo-next" aria-label="Next image" disabled>Next</button>{% endmatch %}
  </div>
</div>"#,
    ext = "html"
)]
struct SelectedTemplate<'a> {
    item: ItemView<'a>,
    prev: Option<i64>,
    next: Option<i64>,
}

/// "1 match" / "N matches"
pub fn match_count_label(count: usize) -> String {
    if count == 1 {
        "1 match".to_string()
    } else {
        format!("{count} matches")
    }
}

/// One gallery card
pub fn render_card(item: &GalleryItem) -> Result<String> {
    Ok(CardTemplate {
        item: ItemView::new(item),
    }
    .render()?)
}

/// The pagination control; empty when there is a single page
pub fn render_pagination(page: usize, total_pages: usize) -> Result<String> {
    let Some(pagination) = Pagination::new(page, total_pages) else {
        return Ok(String::new());
    };

    Ok(PaginationTemplate {
        prev: pagination.prev,
        next: pagination.next,
        buttons: pagination.slots.into_iter().map(PageButton::from).collect(),
    }
    .render()?)
}

fn render_message(class: &str, message: &str) -> Result<String> {
    Ok(MessageTemplate { class, message }.render()?)
}

/// The current page of the gallery, or its placeholder state
pub fn render_gallery(gallery: &Gallery) -> Result<String> {
    match gallery.view() {
        GalleryView::Prompt => render_message("gallery-prompt", PROMPT_MESSAGE),
        GalleryView::NoMatches => render_message("gallery-empty", NO_MATCHES_MESSAGE),
        GalleryView::Results {
            items,
            page,
            total_pages,
            match_count,
        } => {
            let cards = items
                .into_iter()
                .map(render_card)
                .collect::<Result<Vec<_>>>()?;

            Ok(GridTemplate {
                match_label: match_count_label(match_count),
                cards,
                pagination: render_pagination(page, total_pages)?,
            }
            .render()?)
        }
    }
}

/// Shown instead of the gallery when the document cannot be loaded
pub fn render_load_error() -> Result<String> {
    render_message("gallery-error", LOAD_ERROR_MESSAGE)
}

/// The promoted row
pub fn render_promoted(items: &[&GalleryItem]) -> Result<String> {
    if items.is_empty() {
        return render_message("promoted-empty", NO_PROMOTED_MESSAGE);
    }

    Ok(PromotedTemplate {
        items: items.iter().map(|item| ItemView::new(item)).collect(),
    }
    .render()?)
}

/// Detail view of a single item, or the not-found message
pub fn render_selected(selection: Option<Selection<'_>>) -> Result<String> {
    let Some(selection) = selection else {
        return render_message("selected-missing", NOT_FOUND_MESSAGE);
    };

    Ok(SelectedTemplate {
        item: ItemView::new(selection.item),
        prev: selection.prev,
        next: selection.next,
    }
    .render()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GalleryConfig, PristineView};

    fn item(id: i64, title: &str) -> GalleryItem {
        let mut item = GalleryItem::new(id, title, "1.2k");
        item.image.src = format!("img/{id}.jpg");
        item
    }

    fn gallery(count: i64, pristine_view: PristineView) -> Gallery {
        let items = (1..=count).map(|id| item(id, &format!("Photo {id}"))).collect();
        let config = GalleryConfig {
            pristine_view,
            cache_path: None,
            ..GalleryConfig::default()
        };
        Gallery::new(items, &config)
    }

    #[test]
    fn test_card_defaults_and_escaping() {
        let mut untitled = item(3, "");
        untitled.description = "<script>alert(1)</script>".to_string();
        let html = render_card(&untitled).unwrap();

        assert!(html.contains(r#"data-id="3""#));
        assert!(html.contains(r#"aria-describedby="img-3-title""#));
        assert!(html.contains(">Untitled</h3>"));
        assert!(html.contains(r#"alt="Untitled""#));
        assert!(html.contains(r#"alt="Author avatar""#));
        assert!(html.contains("1.2 k"));
        assert!(html.contains(r#"aria-label="1.2k views""#));
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
        assert!(html.contains("<svg"));
    }

    #[test]
    fn test_grid_with_pagination() {
        let mut gallery = gallery(25, PristineView::FullList);
        let html = render_gallery(&gallery).unwrap();

        assert_eq!(html.matches("<figure").count(), 20);
        assert!(html.contains("25 matches"));
        assert!(html.contains(r#"aria-current="page">1</button>"#));
        assert!(html.contains(r#"<button type="button" class="arrow prev" disabled>Previous</button>"#));

        gallery.next_page();
        let html = render_gallery(&gallery).unwrap();
        assert_eq!(html.matches("<figure").count(), 5);
        assert!(html.contains(r#"<button type="button" class="arrow next" disabled>Next</button>"#));
    }

    #[test]
    fn test_single_page_has_no_nav() {
        let html = render_gallery(&gallery(3, PristineView::FullList)).unwrap();
        assert!(html.contains("3 matches"));
        assert!(!html.contains("gallery-pagination"));
    }

    #[test]
    fn test_placeholder_states() {
        let mut gallery = gallery(3, PristineView::Prompt);
        assert!(render_gallery(&gallery).unwrap().contains(PROMPT_MESSAGE));

        gallery.set_query("nothing like this");
        let html = render_gallery(&gallery).unwrap();
        assert!(html.contains(NO_MATCHES_MESSAGE));
        assert!(!html.contains("<figure"));

        assert!(render_load_error().unwrap().contains(LOAD_ERROR_MESSAGE));
    }

    #[test]
    fn test_match_count_label() {
        assert_eq!(match_count_label(0), "0 matches");
        assert_eq!(match_count_label(1), "1 match");
        assert_eq!(match_count_label(12), "12 matches");
    }

    #[test]
    fn test_promoted_row() {
        let gallery = gallery(8, PristineView::FullList);
        let html = render_promoted(&gallery.promoted()).unwrap();
        assert_eq!(html.matches(r#"class="promoted-card""#).count(), 6);
        assert!(html.contains("Promoted: Photo 1"));

        assert!(render_promoted(&[]).unwrap().contains(NO_PROMOTED_MESSAGE));
    }

    #[test]
    fn test_selected_view() {
        let gallery = gallery(3, PristineView::FullList);
        let html = render_selected(gallery.selected(1)).unwrap();
        assert!(html.contains("Photo 1"));
        assert!(html.contains(r#"aria-label="Previous image" disabled"#));
        assert!(html.contains(r#"class="photo-next" data-id="2""#));
        assert!(html.contains(">Unknown</span>"));

        assert!(render_selected(gallery.selected(42)).unwrap().contains(NOT_FOUND_MESSAGE));
    }
}
