//! Maps a [`Category`] onto the OpenStreetMap tags Overpass should search
//! for. `Category::All` is the union of every mapped tag (§4.5).

use vicinity_models::Category;

/// An OSM tag, e.g. `("amenity", "restaurant")`.
pub type OsmTag = (&'static str, &'static str);

const RESTAURANT: &[OsmTag] = &[("amenity", "restaurant")];
const CAFE: &[OsmTag] = &[("amenity", "cafe")];
const BAR: &[OsmTag] = &[("amenity", "bar"), ("amenity", "pub")];
const TOURIST_ATTRACTION: &[OsmTag] = &[("tourism", "attraction")];
const MUSEUM: &[OsmTag] = &[("tourism", "museum")];
const PARK: &[OsmTag] = &[("leisure", "park")];
const HOTEL: &[OsmTag] = &[("tourism", "hotel")];
const SHOPPING: &[OsmTag] = &[("shop", "mall"), ("shop", "department_store")];
const ENTERTAINMENT: &[OsmTag] = &[("amenity", "cinema"), ("amenity", "theatre")];

/// Returns the OSM tags to query for `category`. `Category::All` unions
/// every tag across all other categories.
#[must_use]
pub fn tags_for(category: Category) -> Vec<OsmTag> {
    match category {
        Category::Restaurant => RESTAURANT.to_vec(),
        Category::Cafe => CAFE.to_vec(),
        Category::Bar => BAR.to_vec(),
        Category::TouristAttraction => TOURIST_ATTRACTION.to_vec(),
        Category::Museum => MUSEUM.to_vec(),
        Category::Park => PARK.to_vec(),
        Category::Hotel => HOTEL.to_vec(),
        Category::Shopping => SHOPPING.to_vec(),
        Category::Entertainment => ENTERTAINMENT.to_vec(),
        Category::All => [
            RESTAURANT, CAFE, BAR, TOURIST_ATTRACTION, MUSEUM, PARK, HOTEL, SHOPPING, ENTERTAINMENT,
        ]
        .concat(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_category_maps_to_non_empty_tags() {
        assert!(!tags_for(Category::Restaurant).is_empty());
    }

    #[test]
    fn all_category_unions_every_other_categorys_tags() {
        let all = tags_for(Category::All);
        assert!(all.contains(&("amenity", "restaurant")));
        assert!(all.contains(&("tourism", "museum")));
        assert!(all.contains(&("shop", "mall")));
    }
}
