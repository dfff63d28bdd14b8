//! Extraction adapter for sokolov.ru product pages
//!
//! Every sokolov.ru product page carries two blocks this adapter works
//! against:
//! - a `.product` div with `data-list-id=product`, holding the main
//!   product info (title, price, category, images);
//! - a `#props` div with the detailed jewel properties: physical
//!   characteristics (metal, probe, gem inserts, weight, width,
//!   height), collection and the free-form description.
//!
//! Most properties live in one flat list inside `#props`, so they are
//! extracted in a single prelude pass over that list instead of one
//! query per field. Gem inserts get their own pass that reduces each
//! insert block to a sentence.

use std::collections::HashMap;

use scraper::{ElementRef, Html, Selector};

use crate::jewel::Field;
use crate::loader::JewelLoader;
use crate::parser::{JewelParser, ParseError};
use crate::processors::OutputProcessor;

/// Fallback when the page carries no category attribute.
const DEFAULT_CATEGORY: &str = "Ювелирные украшения";
/// Tab holding the product description (as opposed to the brand blurb).
const DESCRIPTION_TAB_NAME: &str = "Об украшении";

fn selector(css: &str) -> Result<Selector, ParseError> {
    Selector::parse(css).map_err(|e| ParseError::Selector(format!("'{css}': {e}")))
}

/// Parser for one sokolov.ru product page.
///
/// Binds the two page regions at construction; a region missing from
/// the markup simply yields no values for the fields it feeds.
pub struct SokolovRuParser<'a> {
    /// Main product info block
    product: Option<ElementRef<'a>>,
    /// Detailed jewel properties block
    props: Option<ElementRef<'a>>,
}

impl<'a> SokolovRuParser<'a> {
    /// Bind the adapter to a parsed product page.
    pub fn new(document: &'a Html) -> Result<Self, ParseError> {
        let product = document
            .select(&selector(".product[data-list-id=product]")?)
            .next();
        let props = document.select(&selector("#props")?).next();
        Ok(Self { product, props })
    }

    /// First attribute value matched by `css` inside a region.
    fn region_attr(
        &self,
        region: Option<ElementRef<'a>>,
        css: &str,
        attr: &str,
    ) -> Result<Option<&'a str>, ParseError> {
        let Some(region) = region else {
            return Ok(None);
        };
        let sel = selector(css)?;
        Ok(region.select(&sel).next().and_then(|el| el.value().attr(attr)))
    }

    /// Text content of every element matched by `css` inside a region,
    /// one entry per element, in document order.
    fn region_texts(
        &self,
        region: Option<ElementRef<'a>>,
        css: &str,
    ) -> Result<Vec<String>, ParseError> {
        let Some(region) = region else {
            return Ok(Vec::new());
        };
        let sel = selector(css)?;
        Ok(region
            .select(&sel)
            .map(|el| el.text().collect::<String>())
            .collect())
    }

    /// Iterate the `.props-list` items under `element` and collect
    /// their (name, value) pairs. Names and values sit in `.name` and
    /// `.val` divs, each optionally wrapped in a span.
    fn props_entries(
        &self,
        element: ElementRef<'a>,
        name_in_span: bool,
        value_in_span: bool,
    ) -> Result<Vec<(String, String)>, ParseError> {
        let item_sel = selector(".props-list")?;
        let name_sel = selector(if name_in_span { ".name > span" } else { ".name" })?;
        let value_sel = selector(if value_in_span { ".val > span" } else { ".val" })?;

        let mut entries = Vec::new();
        for prop in element.select(&item_sel) {
            let name = prop
                .select(&name_sel)
                .next()
                .map(|el| el.text().collect::<String>())
                .unwrap_or_default();
            let value = prop
                .select(&value_sel)
                .next()
                .map(|el| el.text().collect::<String>())
                .unwrap_or_default();
            entries.push((name.trim().to_string(), value.trim().to_string()));
        }
        Ok(entries)
    }

    /// Main image URL from the `data-src` attribute of the image
    /// marked with the `contentUrl` itemprop.
    fn extract_image_urls(&self, loader: &mut JewelLoader) -> Result<(), ParseError> {
        let url = self.region_attr(self.product, "img[itemprop=contentUrl]", "data-src")?;
        loader.add_optional(Field::ImageUrls, url)?;
        Ok(())
    }

    /// Title from the `data-detail-name` attribute of the `h1`.
    fn extract_title(&self, loader: &mut JewelLoader) -> Result<(), ParseError> {
        let title = self.region_attr(self.product, "h1", "data-detail-name")?;
        loader.add_optional(Field::Title, title)?;
        Ok(())
    }

    /// Category from the `data-detail-category` attribute of the main
    /// product block. The attribute is a slash-delimited taxonomy
    /// ("category/sub-category/..."); the second segment is taken when
    /// present because the first one is a generic store-wide label.
    fn extract_category(&self, loader: &mut JewelLoader) -> Result<(), ParseError> {
        let category = self
            .product
            .and_then(|el| el.value().attr("data-detail-category"))
            .unwrap_or(DEFAULT_CATEGORY);

        let segments: Vec<&str> = category.split('/').collect();
        let category = if segments.len() > 1 {
            segments[1]
        } else {
            segments[0]
        };
        loader.add_value(Field::Category, category)?;
        Ok(())
    }

    /// Product id from the meta tag with the `sku` itemprop.
    fn extract_sku(&self, loader: &mut JewelLoader) -> Result<(), ParseError> {
        let sku = self.region_attr(self.product, "meta[itemprop=sku]", "content")?;
        loader.add_optional(Field::Sku, sku)?;
        Ok(())
    }

    /// Price from the meta tag with the `price` itemprop.
    fn extract_price(&self, loader: &mut JewelLoader) -> Result<(), ParseError> {
        let price = self.region_attr(self.product, "meta[itemprop=price]", "content")?;
        loader.add_optional(Field::Price, price)?;
        Ok(())
    }

    /// Currency from the meta tag with the `priceCurrency` itemprop.
    fn extract_currency(&self, loader: &mut JewelLoader) -> Result<(), ParseError> {
        let currency = self.region_attr(self.product, "meta[itemprop=priceCurrency]", "content")?;
        loader.add_optional(Field::Currency, currency)?;
        Ok(())
    }

    /// Description text from the `#props` tabs.
    ///
    /// Pages carry up to two tabbed descriptions: one about the product
    /// and one about the brand. Tab names and tab bodies come as two
    /// parallel lists; the body at the index of the tab named
    /// "Об украшении" is the product description. Pages with only the
    /// brand tab yield no description.
    fn extract_description(&self, loader: &mut JewelLoader) -> Result<(), ParseError> {
        let tab_names = self.region_texts(self.props, ".tab-header-item > p")?;
        let tab_texts = self.region_texts(self.props, ".props.wrap-text-show > p")?;

        if let Some(index) = tab_names.iter().position(|name| name == DESCRIPTION_TAB_NAME) {
            if let Some(text) = tab_texts.get(index) {
                loader.add_value(Field::Description, text)?;
            }
        }
        Ok(())
    }

    /// Scan the flat property list in `#props` and route entries to
    /// schema fields by their exact names. Dimension values carry a
    /// unit suffix ("1.5 мм"), so only the leading numeric token is
    /// pushed.
    fn parse_props_list(&self, loader: &mut JewelLoader) -> Result<(), ParseError> {
        let Some(props) = self.props else {
            return Ok(());
        };

        for (name, value) in self.props_entries(props, true, true)? {
            match name.as_str() {
                "Коллекция" => loader.add_value(Field::Collection, &value)?,
                "Бренд" => loader.add_value(Field::Brand, &value)?,
                "Для кого" => loader.add_value(Field::ForWhom, &value)?,
                "Тип металла" => loader.add_value(Field::Metal, &value)?,
                "Проба" => loader.add_value(Field::Probe, &value)?,
                "Примерный вес" => loader.add_optional(Field::Weight, first_token(&value))?,
                "Ширина" => loader.add_optional(Field::Width, first_token(&value))?,
                "Высота" => loader.add_optional(Field::Height, first_token(&value))?,
                // Pages listing both "Высота" and "Длина" use height for
                // the thickness; length is the dimension wanted. Both
                // share the height slot and its take-max reduction keeps
                // the larger value whichever comes first.
                "Длина" => loader.add_optional(Field::Height, first_token(&value))?,
                _ => {}
            }
        }
        Ok(())
    }

    /// Reduce each gem insert block to a sentence and push all of them
    /// joined as one `gems` value. Pages without inserts push nothing.
    fn parse_props_insert(&self, loader: &mut JewelLoader) -> Result<(), ParseError> {
        let Some(props) = self.props else {
            return Ok(());
        };
        let insert_sel = selector(".props-insert__item")?;

        let mut gem_descs = Vec::new();
        for insert in props.select(&insert_sel) {
            // Insert names are not span-wrapped, unlike the main list.
            let insert_props: HashMap<String, String> =
                self.props_entries(insert, false, true)?.into_iter().collect();
            gem_descs.push(compose_gem_description(&insert_props)?);
        }

        if !gem_descs.is_empty() {
            loader.add_value(Field::Gems, gem_descs.join(". "))?;
        }
        Ok(())
    }
}

/// Compose the sentence describing one kind of gem insert:
/// `<Тип>, <Количество>[, цвет ...][, огранка ...][, форма ...]
/// [, качество <Цветность>/<Чистота>][, вес ...]`
///
/// The quality clause appears only when both the chromaticity and
/// purity grades are present. A block without type or count is a
/// markup break and fails the page.
fn compose_gem_description(props: &HashMap<String, String>) -> Result<String, ParseError> {
    let gem_type = props
        .get("Тип")
        .ok_or_else(|| ParseError::GemInsert("insert block without 'Тип'".to_string()))?;
    let count = props
        .get("Количество")
        .ok_or_else(|| ParseError::GemInsert("insert block without 'Количество'".to_string()))?;

    let mut parts = vec![gem_type.clone(), count.clone()];

    if let Some(color) = props.get("Цвет") {
        parts.push(format!("цвет {}", color.to_lowercase()));
    }
    if let Some(cut) = props.get("Огранка") {
        parts.push(format!("огранка {cut}"));
    }
    if let Some(shape) = props.get("Форма") {
        parts.push(format!("форма {}", shape.to_lowercase()));
    }
    if let (Some(chromaticity), Some(purity)) = (props.get("Цветность"), props.get("Чистота")) {
        parts.push(format!("качество {chromaticity}/{purity}"));
    }
    if let Some(weight) = props.get("Вес") {
        parts.push(format!("вес {weight}"));
    }

    Ok(parts.join(", "))
}

fn first_token(value: &str) -> Option<&str> {
    value.split_whitespace().next()
}

impl JewelParser for SokolovRuParser<'_> {
    fn fields(&self) -> &[Field] {
        &[
            Field::Title,
            Field::Description,
            Field::Category,
            Field::Brand,
            Field::Price,
            Field::Currency,
            Field::Sku,
            Field::Metal,
            Field::Probe,
            Field::ImageUrls,
        ]
    }

    fn loader(&self) -> JewelLoader {
        // Length values land in the height slot, see parse_props_list.
        JewelLoader::new().with_output(Field::Height, OutputProcessor::TakeMax)
    }

    fn prelude(&self, loader: &mut JewelLoader) -> Result<(), ParseError> {
        self.parse_props_list(loader)?;
        self.parse_props_insert(loader)
    }

    fn extract(&self, field: Field, loader: &mut JewelLoader) -> Result<(), ParseError> {
        match field {
            Field::ImageUrls => self.extract_image_urls(loader),
            Field::Title => self.extract_title(loader),
            Field::Category => self.extract_category(loader),
            Field::Sku => self.extract_sku(loader),
            Field::Price => self.extract_price(loader),
            Field::Currency => self.extract_currency(loader),
            Field::Description => self.extract_description(loader),
            // Populated by the property-list prelude; the generic
            // dispatch must not extract them a second time.
            Field::Metal | Field::Probe | Field::Brand => Ok(()),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jewel::Jewel;
    use crate::parser::{parse_jewel, MissingFieldPolicy};

    fn parse_page(html: &str) -> Result<Jewel, ParseError> {
        let document = Html::parse_document(html);
        let parser = SokolovRuParser::new(&document)?;
        parse_jewel(&parser, MissingFieldPolicy::Allow)
    }

    fn props_list_item(name: &str, value: &str) -> String {
        format!(
            r#"<div class="props-list">
                 <div class="name"><span>{name}</span></div>
                 <div class="val"><span>{value}</span></div>
               </div>"#
        )
    }

    fn product_page(props_body: &str) -> String {
        format!(
            r#"<html><body>
              <div class="product" data-list-id="product"
                   data-detail-category="Украшения/Кольца/Золотые кольца">
                <h1 data-detail-name="Кольцо SOKOLOV из золота"></h1>
                <img itemprop="contentUrl" src="stub.jpg"
                     data-src="https://cdn.sokolov.ru/94012415/1.jpg">
                <meta itemprop="sku" content="94012415">
                <meta itemprop="price" content="12990">
                <meta itemprop="priceCurrency" content="RUB">
              </div>
              <div id="props">{props_body}</div>
            </body></html>"#
        )
    }

    #[test]
    fn extracts_main_product_info() {
        let jewel = parse_page(&product_page("")).unwrap();

        assert_eq!(jewel.title.as_deref(), Some("Кольцо SOKOLOV из золота"));
        assert_eq!(jewel.sku.as_deref(), Some("94012415"));
        assert_eq!(jewel.price, Some(12990.0));
        assert_eq!(jewel.currency.as_deref(), Some("RUB"));
        assert_eq!(
            jewel.image_urls,
            vec!["https://cdn.sokolov.ru/94012415/1.jpg"]
        );
    }

    #[test]
    fn category_takes_second_taxonomy_segment() {
        let jewel = parse_page(&product_page("")).unwrap();
        assert_eq!(jewel.category.as_deref(), Some("Кольца"));
    }

    #[test]
    fn single_segment_category_is_taken_as_is() {
        let html = r#"<html><body>
          <div class="product" data-list-id="product"
               data-detail-category="Подвески"></div>
        </body></html>"#;
        let jewel = parse_page(html).unwrap();
        assert_eq!(jewel.category.as_deref(), Some("Подвески"));
    }

    #[test]
    fn missing_category_attribute_falls_back_to_default() {
        let html = r#"<html><body>
          <div class="product" data-list-id="product"></div>
        </body></html>"#;
        let jewel = parse_page(html).unwrap();
        assert_eq!(jewel.category.as_deref(), Some(DEFAULT_CATEGORY));
    }

    #[test]
    fn props_list_routes_entries_by_name() {
        let props = [
            props_list_item("Коллекция", "Love"),
            props_list_item("Бренд", "SOKOLOV"),
            props_list_item("Для кого", "Для женщин"),
            props_list_item("Тип металла", "Золото красное"),
            props_list_item("Проба", "585"),
            props_list_item("Примерный вес", "1.87 г"),
            props_list_item("Ширина", "4 мм"),
            props_list_item("Неизвестное свойство", "что-то"),
        ]
        .concat();
        let jewel = parse_page(&product_page(&props)).unwrap();

        assert_eq!(jewel.collection.as_deref(), Some("Love"));
        assert_eq!(jewel.brand.as_deref(), Some("SOKOLOV"));
        assert_eq!(jewel.for_whom.as_deref(), Some("Для женщин"));
        assert_eq!(jewel.metal.as_deref(), Some("Золото красное"));
        assert_eq!(jewel.probe.as_deref(), Some("585"));
        assert_eq!(jewel.weight, Some(1.87));
        assert_eq!(jewel.width, Some(4.0));
    }

    #[test]
    fn length_wins_over_height_in_either_order() {
        let height_first = [
            props_list_item("Высота", "3 мм"),
            props_list_item("Длина", "18 мм"),
        ]
        .concat();
        let length_first = [
            props_list_item("Длина", "18 мм"),
            props_list_item("Высота", "3 мм"),
        ]
        .concat();

        for props in [height_first, length_first] {
            let jewel = parse_page(&product_page(&props)).unwrap();
            assert_eq!(jewel.height, Some(18.0));
        }
    }

    #[test]
    fn description_comes_from_the_product_tab() {
        let props = r#"
          <div class="tab-header-item"><p>О бренде</p></div>
          <div class="tab-header-item"><p>Об украшении</p></div>
          <div class="props wrap-text-show"><p>Текст о бренде</p></div>
          <div class="props wrap-text-show"><p>Текст об украшении</p></div>
        "#;
        let jewel = parse_page(&product_page(props)).unwrap();
        assert_eq!(jewel.description.as_deref(), Some("Текст об украшении"));
    }

    #[test]
    fn brand_only_tab_yields_no_description() {
        let props = r#"
          <div class="tab-header-item"><p>О бренде</p></div>
          <div class="props wrap-text-show"><p>Текст о бренде</p></div>
        "#;
        let jewel = parse_page(&product_page(props)).unwrap();
        assert_eq!(jewel.description, None);
    }

    fn insert_item(pairs: &[(&str, &str)]) -> String {
        let body: String = pairs
            .iter()
            .map(|(name, value)| {
                format!(
                    r#"<div class="props-list">
                         <div class="name">{name}</div>
                         <div class="val"><span>{value}</span></div>
                       </div>"#
                )
            })
            .collect();
        format!(r#"<div class="props-insert__item">{body}</div>"#)
    }

    #[test]
    fn gem_description_minimal_block() {
        let props = insert_item(&[("Тип", "Бриллиант"), ("Количество", "1")]);
        let jewel = parse_page(&product_page(&props)).unwrap();
        assert_eq!(jewel.gems.as_deref(), Some("Бриллиант, 1"));
    }

    #[test]
    fn gem_description_with_optional_clauses() {
        let props = insert_item(&[
            ("Тип", "Бриллиант"),
            ("Количество", "3"),
            ("Цвет", "Белый"),
            ("Огранка", "Кр-57"),
            ("Форма", "Круг"),
            ("Цветность", "G"),
            ("Чистота", "VS1"),
            ("Вес", "0.12 карат"),
        ]);
        let jewel = parse_page(&product_page(&props)).unwrap();
        assert_eq!(
            jewel.gems.as_deref(),
            Some("Бриллиант, 3, цвет белый, огранка Кр-57, форма круг, качество G/VS1, вес 0.12 карат")
        );
    }

    #[test]
    fn quality_clause_needs_both_grades() {
        for lone_grade in [("Цветность", "G"), ("Чистота", "VS1")] {
            let props = insert_item(&[("Тип", "Бриллиант"), ("Количество", "1"), lone_grade]);
            let jewel = parse_page(&product_page(&props)).unwrap();
            assert_eq!(jewel.gems.as_deref(), Some("Бриллиант, 1"));
        }
    }

    #[test]
    fn multiple_inserts_join_into_one_sentence_list() {
        let props = [
            insert_item(&[("Тип", "Бриллиант"), ("Количество", "1")]),
            insert_item(&[("Тип", "Сапфир"), ("Количество", "2"), ("Цвет", "Синий")]),
        ]
        .concat();
        let jewel = parse_page(&product_page(&props)).unwrap();
        assert_eq!(
            jewel.gems.as_deref(),
            Some("Бриллиант, 1. Сапфир, 2, цвет синий")
        );
    }

    #[test]
    fn insert_without_type_fails_the_page() {
        let props = insert_item(&[("Количество", "1")]);
        let err = parse_page(&product_page(&props)).unwrap_err();
        assert!(matches!(err, ParseError::GemInsert(_)));
    }

    #[test]
    fn page_without_inserts_has_no_gems_value() {
        let jewel = parse_page(&product_page("")).unwrap();
        assert_eq!(jewel.gems, None);
    }

    #[test]
    fn page_without_known_regions_yields_only_the_default_category() {
        let jewel = parse_page("<html><body><p>страница не найдена</p></body></html>").unwrap();
        let expected = Jewel {
            category: Some(DEFAULT_CATEGORY.to_string()),
            ..Default::default()
        };
        assert_eq!(jewel, expected);
    }

    #[test]
    fn non_numeric_price_surfaces_as_format_error() {
        let html = r#"<html><body>
          <div class="product" data-list-id="product">
            <meta itemprop="price" content="по запросу">
          </div>
        </body></html>"#;
        let err = parse_page(html).unwrap_err();
        assert!(matches!(err, ParseError::Processor(_)));
    }
}
