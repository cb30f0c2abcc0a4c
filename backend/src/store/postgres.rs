use diesel::pg::Pg;
use diesel::prelude::*;
use std::collections::HashMap;

use crate::db::{PgPool, PgPooled};
use crate::models::{
    Favorite, FavoriteRow, ImageRow, Media, NamedRef, NewFavorite, Property, PropertyRow, Taxonomy,
};
use crate::schema::{amenities, categories, favorites, locations, properties, property_amenities, property_images};
use crate::store::{
    FavoriteStore, Page, PageRequest, PropertyFilter, PropertyQuery, PropertySort, PropertyStore, StoreError,
};

/// Diesel-backed store over an r2d2 pool.
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> Result<PgPooled, StoreError> {
        Ok(self.pool.get()?)
    }
}

fn filtered(filter: &PropertyFilter) -> properties::BoxedQuery<'static, Pg> {
    let mut query = properties::table.into_boxed();
    if let Some(listing_type) = filter.listing_type {
        query = query.filter(properties::listing_type.eq(listing_type.as_str()));
    }
    if let Some(category_id) = filter.category_id {
        query = query.filter(properties::category_id.eq(category_id));
    }
    if let Some(location_id) = filter.location_id {
        query = query.filter(properties::location_id.eq(location_id));
    }
    if let Some(min_price) = filter.min_price {
        query = query.filter(properties::price.ge(min_price));
    }
    if let Some(max_price) = filter.max_price {
        query = query.filter(properties::price.le(max_price));
    }
    if let Some(min_rooms) = filter.min_rooms {
        query = query.filter(properties::rooms.ge(min_rooms));
    }
    if let Some(ids) = &filter.ids {
        query = query.filter(properties::id.eq_any(ids.clone()));
    }
    query
}

fn sorted(query: properties::BoxedQuery<'static, Pg>, sort: PropertySort) -> properties::BoxedQuery<'static, Pg> {
    match sort {
        PropertySort::CreatedAtDesc => query.order((properties::created_at.desc(), properties::id.desc())),
        PropertySort::CreatedAtAsc => query.order((properties::created_at.asc(), properties::id.asc())),
        PropertySort::PriceAsc => query.order((properties::price.asc(), properties::id.asc())),
        PropertySort::PriceDesc => query.order((properties::price.desc(), properties::id.desc())),
    }
}

/// Resolves category, location, amenities and images for a batch of rows,
/// preserving the batch order.
fn populate(conn: &mut PgConnection, rows: Vec<PropertyRow>) -> Result<Vec<Property>, StoreError> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<i32> = rows.iter().map(|row| row.id).collect();
    let category_ids: Vec<i32> = rows.iter().filter_map(|row| row.category_id).collect();
    let location_ids: Vec<i32> = rows.iter().filter_map(|row| row.location_id).collect();

    let category_names: HashMap<i32, String> = categories::table
        .filter(categories::id.eq_any(category_ids))
        .select((categories::id, categories::name))
        .load::<(i32, String)>(conn)?
        .into_iter()
        .collect();
    let location_names: HashMap<i32, String> = locations::table
        .filter(locations::id.eq_any(location_ids))
        .select((locations::id, locations::name))
        .load::<(i32, String)>(conn)?
        .into_iter()
        .collect();

    let mut amenities_by_property: HashMap<i32, Vec<NamedRef>> = HashMap::new();
    for (property_id, id, name) in property_amenities::table
        .inner_join(amenities::table)
        .filter(property_amenities::property_id.eq_any(ids.clone()))
        .order(amenities::name.asc())
        .select((property_amenities::property_id, amenities::id, amenities::name))
        .load::<(i32, i32, String)>(conn)?
    {
        amenities_by_property
            .entry(property_id)
            .or_default()
            .push(NamedRef { id, name });
    }

    let mut images_by_property: HashMap<i32, Vec<Media>> = HashMap::new();
    for image in property_images::table
        .filter(property_images::property_id.eq_any(ids))
        .order((property_images::property_id, property_images::position, property_images::id))
        .select(ImageRow::as_select())
        .load::<ImageRow>(conn)?
    {
        images_by_property
            .entry(image.property_id)
            .or_default()
            .push(Media::from(image));
    }

    let named = |names: &HashMap<i32, String>, id: Option<i32>| {
        id.and_then(|id| names.get(&id).map(|name| NamedRef { id, name: name.clone() }))
    };

    rows.into_iter()
        .map(|row| {
            let listing_type = row
                .listing_type
                .parse()
                .map_err(|e| StoreError::CorruptRow(format!("property {}: listing_type {}", row.id, e)))?;
            let listing_status = row
                .listing_status
                .parse()
                .map_err(|e| StoreError::CorruptRow(format!("property {}: listing_status {}", row.id, e)))?;
            Ok(Property {
                coordinates: row.coordinates(),
                category: named(&category_names, row.category_id),
                location: named(&location_names, row.location_id),
                amenities: amenities_by_property.remove(&row.id).unwrap_or_default(),
                images: images_by_property.remove(&row.id).unwrap_or_default(),
                id: row.id,
                document_id: row.document_id,
                title: row.title,
                description: row.description,
                price: row.price,
                area: row.area,
                rooms: row.rooms,
                floor: row.floor,
                address: row.address,
                listing_type,
                listing_status,
                created_at: row.created_at,
                updated_at: row.updated_at,
                published_at: row.published_at,
            })
        })
        .collect()
}

impl PropertyStore for PgStore {
    fn list_properties(&self, query: &PropertyQuery) -> Result<Page<Property>, StoreError> {
        let mut conn = self.conn()?;
        let total = filtered(&query.filter).count().get_result::<i64>(&mut conn)?;

        let (offset, limit) = query.page.window();
        let mut rows = sorted(filtered(&query.filter), query.sort).offset(offset as i64);
        if let Some(limit) = limit {
            rows = rows.limit(limit as i64);
        }
        let rows = rows.load::<PropertyRow>(&mut conn)?;
        let items = populate(&mut conn, rows)?;
        Ok(Page::new(items, query.page, total as u64))
    }

    fn property_by_document_id(&self, document_id: &str) -> Result<Option<Property>, StoreError> {
        let mut conn = self.conn()?;
        let row = properties::table
            .filter(properties::document_id.eq(document_id))
            .first::<PropertyRow>(&mut conn)
            .optional()?;
        match row {
            Some(row) => Ok(populate(&mut conn, vec![row])?.pop()),
            None => Ok(None),
        }
    }

    fn property_exists(&self, id: i32) -> Result<bool, StoreError> {
        let mut conn = self.conn()?;
        Ok(diesel::select(diesel::dsl::exists(properties::table.find(id))).get_result::<bool>(&mut conn)?)
    }

    fn list_categories(&self) -> Result<Vec<Taxonomy>, StoreError> {
        let mut conn = self.conn()?;
        let rows = categories::table
            .order(categories::name.asc())
            .select((categories::id, categories::document_id, categories::name))
            .load::<(i32, String, String)>(&mut conn)?;
        Ok(rows
            .into_iter()
            .map(|(id, document_id, name)| Taxonomy { id, document_id, name })
            .collect())
    }

    fn list_locations(&self) -> Result<Vec<Taxonomy>, StoreError> {
        let mut conn = self.conn()?;
        let rows = locations::table
            .order(locations::name.asc())
            .select((locations::id, locations::document_id, locations::name))
            .load::<(i32, String, String)>(&mut conn)?;
        Ok(rows
            .into_iter()
            .map(|(id, document_id, name)| Taxonomy { id, document_id, name })
            .collect())
    }
}

impl FavoriteStore for PgStore {
    fn favorites_for_user(&self, user_id: i32, page: PageRequest) -> Result<Page<Favorite>, StoreError> {
        let mut conn = self.conn()?;
        let total = favorites::table
            .filter(favorites::user_id.eq(user_id))
            .count()
            .get_result::<i64>(&mut conn)?;

        let (offset, limit) = page.window();
        let mut rows = favorites::table
            .filter(favorites::user_id.eq(user_id))
            .order((favorites::created_at.desc(), favorites::id.desc()))
            .offset(offset as i64)
            .into_boxed();
        if let Some(limit) = limit {
            rows = rows.limit(limit as i64);
        }
        let rows = rows.load::<FavoriteRow>(&mut conn)?;

        let property_ids: Vec<i32> = rows.iter().map(|row| row.property_id).collect();
        let property_rows = properties::table
            .filter(properties::id.eq_any(property_ids))
            .load::<PropertyRow>(&mut conn)?;
        let by_id: HashMap<i32, Property> = populate(&mut conn, property_rows)?
            .into_iter()
            .map(|property| (property.id, property))
            .collect();

        let items = rows
            .into_iter()
            .map(|row| {
                let property = by_id.get(&row.property_id).cloned();
                Favorite::from(row).with_property(property)
            })
            .collect();
        Ok(Page::new(items, page, total as u64))
    }

    fn find_favorite(&self, user_id: i32, property_id: i32) -> Result<Option<Favorite>, StoreError> {
        let mut conn = self.conn()?;
        let row = favorites::table
            .filter(favorites::user_id.eq(user_id))
            .filter(favorites::property_id.eq(property_id))
            .order(favorites::id.asc())
            .first::<FavoriteRow>(&mut conn)
            .optional()?;
        Ok(row.map(Favorite::from))
    }

    fn insert_favorite(&self, favorite: NewFavorite) -> Result<Favorite, StoreError> {
        let mut conn = self.conn()?;
        let row = diesel::insert_into(favorites::table)
            .values(&favorite)
            .returning(FavoriteRow::as_returning())
            .get_result::<FavoriteRow>(&mut conn)?;
        log::info!("Stored favorite {} (user {}, property {})", row.id, row.user_id, row.property_id);
        Ok(Favorite::from(row))
    }

    fn delete_favorite(&self, favorite_id: i32) -> Result<Option<Favorite>, StoreError> {
        let mut conn = self.conn()?;
        let row = diesel::delete(favorites::table.find(favorite_id))
            .returning(FavoriteRow::as_returning())
            .get_result::<FavoriteRow>(&mut conn)
            .optional()?;
        if let Some(row) = &row {
            log::info!("Deleted favorite {} (user {}, property {})", row.id, row.user_id, row.property_id);
        }
        Ok(row.map(Favorite::from))
    }
}
