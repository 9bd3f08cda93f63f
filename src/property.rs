//! Map decoded API response trees into typed property records.
//!
//! This is the core of the crate. The API returns inconsistently shaped
//! payloads: fields appear and disappear between responses, values are
//! split between attributes and element text, and nested collections are
//! sometimes a single object and sometimes a list. Every field here is
//! extracted independently and tolerantly: a missing or unparseable value
//! becomes `None` for that field only, never an error.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::notices::{self, Notice};
use crate::xml::{as_list, child_int, child_text, node_attr, node_text};

/// One property record mapped from a response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Property {
    /// Zillow's property identifier.
    pub zpid: Option<String>,
    /// Similarity score, present only on comparable records.
    pub similarity_score: Option<f64>,
    /// Related page links.
    pub links: Links,
    /// Physical address and coordinates.
    pub address: Address,
    /// The value estimate.
    pub zestimate: Zestimate,
    /// Regional market data.
    pub local_market: LocalMarket,
    /// Assessment and sale details, populated only at
    /// [`DetailLevel::Extended`].
    pub extended_details: ExtendedDetails,
}

/// Page links attached to a property.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Links {
    pub home_details: Option<String>,
    /// Routinely absent from comparable records.
    pub graphs_and_data: Option<String>,
    pub map_this_home: Option<String>,
    pub comparables: Option<String>,
}

/// Street address and coordinates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub street: Option<String>,
    pub zipcode: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// The value estimate for a property.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Zestimate {
    /// Estimated value in whole currency units.
    pub amount: Option<i64>,
    /// Currency code from the amount node's attribute.
    pub currency: Option<String>,
    /// Raw date text, as the API formats it.
    pub last_updated: Option<String>,
    /// Value change over the trailing 30 days.
    pub value_change_30day: Option<i64>,
    pub valuation_range_low: Option<i64>,
    pub valuation_range_high: Option<i64>,
}

/// Regional market data for the property's area.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocalMarket {
    pub region_name: Option<String>,
    pub region_id: Option<String>,
    pub region_type: Option<String>,
    /// Home-value index, kept as raw text (the API formats it with
    /// thousands separators).
    pub home_value_index: Option<String>,
    pub overview_link: Option<String>,
    pub fsbo_link: Option<String>,
    pub sale_link: Option<String>,
}

/// Assessment and sale details from the deep endpoints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtendedDetails {
    pub fips_county: Option<String>,
    pub use_code: Option<String>,
    pub tax_assessment_year: Option<String>,
    pub tax_assessment: Option<String>,
    pub year_built: Option<String>,
    pub lot_size_sqft: Option<String>,
    pub finished_sqft: Option<String>,
    pub bathrooms: Option<String>,
    pub bedrooms: Option<String>,
    pub last_sold_date: Option<String>,
    pub last_sold_price: Option<i64>,
    /// True once the populate step has run, regardless of how many fields
    /// the response actually carried.
    pub complete: bool,
}

/// How much of a result node to map.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DetailLevel {
    /// Core fields only.
    #[default]
    Standard,
    /// Core fields plus [`ExtendedDetails`], for the deep endpoints.
    Extended,
}

/// Error from mapping a single result node.
///
/// Field-level problems never raise this; only a result scope that is not
/// a mapping node at all does.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum MapError {
    #[error("Result node is not a mapping: found {0}")]
    NotAMapping(&'static str),
}

// ── Mapping ─────────────────────────────────────────────────────────────────

impl Property {
    /// Map a result node into a property record.
    ///
    /// `scope` is the subtree at the operation's result path (a single
    /// `result`, the estimate `response`, a `principal`, or one `comp`).
    /// Missing sections map to fully-default sub-entities; the only failure
    /// is a scope that is not a mapping node.
    pub fn from_tree(scope: &Value, detail: DetailLevel) -> Result<Self, MapError> {
        if !scope.is_object() {
            return Err(MapError::NotAMapping(value_kind(scope)));
        }

        Ok(Self {
            zpid: child_text(scope, "zpid"),
            similarity_score: node_attr(scope, "score").and_then(|s| s.trim().parse().ok()),
            links: scope.get("links").map(Links::from_tree).unwrap_or_default(),
            address: scope
                .get("address")
                .map(Address::from_tree)
                .unwrap_or_default(),
            zestimate: scope
                .get("zestimate")
                .map(Zestimate::from_tree)
                .unwrap_or_default(),
            local_market: scope
                .get("localRealEstate")
                .map(LocalMarket::from_tree)
                .unwrap_or_default(),
            extended_details: match detail {
                DetailLevel::Extended => ExtendedDetails::from_tree(scope),
                DetailLevel::Standard => ExtendedDetails::default(),
            },
        })
    }

    /// Nested plain-value snapshot of every field, with absent fields as
    /// `null`. Feed the result back through `serde_json::from_value` to
    /// restore a record.
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// The former name of the [`zestimate`](Self::zestimate) field, kept
    /// for compatibility with code written against the misspelled name.
    ///
    /// Each access emits one [`Notice::DeprecatedField`] on the notice bus
    /// and a warn-level trace line.
    #[deprecated(note = "renamed to the `zestimate` field")]
    pub fn zestiamte(&self) -> &Zestimate {
        notices::bus().emit(Notice::DeprecatedField {
            old: "zestiamte".to_string(),
            new: "zestimate".to_string(),
        });
        tracing::warn!("field `zestiamte` is deprecated, use `zestimate` instead");
        &self.zestimate
    }
}

impl Links {
    fn from_tree(node: &Value) -> Self {
        Self {
            home_details: child_text(node, "homedetails"),
            graphs_and_data: child_text(node, "graphsanddata"),
            map_this_home: child_text(node, "mapthishome"),
            comparables: child_text(node, "comparables"),
        }
    }
}

impl Address {
    fn from_tree(node: &Value) -> Self {
        Self {
            street: child_text(node, "street"),
            zipcode: child_text(node, "zipcode"),
            city: child_text(node, "city"),
            state: child_text(node, "state"),
            latitude: child_text(node, "latitude").and_then(|s| s.trim().parse().ok()),
            longitude: child_text(node, "longitude").and_then(|s| s.trim().parse().ok()),
        }
    }
}

impl Zestimate {
    fn from_tree(node: &Value) -> Self {
        Self {
            amount: child_int(node, "amount"),
            currency: node.get("amount").and_then(|a| node_attr(a, "currency")),
            last_updated: child_text(node, "last-updated"),
            value_change_30day: child_int(node, "valueChange"),
            valuation_range_low: node
                .get("valuationRange")
                .and_then(|r| child_int(r, "low")),
            valuation_range_high: node
                .get("valuationRange")
                .and_then(|r| child_int(r, "high")),
        }
    }
}

impl LocalMarket {
    fn from_tree(node: &Value) -> Self {
        let region = node.get("region");
        Self {
            region_name: region.and_then(|r| node_attr(r, "name")),
            region_id: region.and_then(|r| node_attr(r, "id")),
            region_type: region.and_then(|r| node_attr(r, "type")),
            home_value_index: region.and_then(|r| child_text(r, "zindexValue")),
            overview_link: region
                .and_then(|r| r.pointer("/links/overview"))
                .and_then(node_text),
            fsbo_link: region
                .and_then(|r| r.pointer("/links/forSaleByOwner"))
                .and_then(node_text),
            sale_link: region
                .and_then(|r| r.pointer("/links/forSale"))
                .and_then(node_text),
        }
    }
}

impl ExtendedDetails {
    /// Extended fields live directly on the result scope, not under a
    /// dedicated child element.
    fn from_tree(scope: &Value) -> Self {
        Self {
            fips_county: child_text(scope, "FIPScounty"),
            use_code: child_text(scope, "useCode"),
            tax_assessment_year: child_text(scope, "taxAssessmentYear"),
            tax_assessment: child_text(scope, "taxAssessment"),
            year_built: child_text(scope, "yearBuilt"),
            lot_size_sqft: child_text(scope, "lotSizeSqFt"),
            finished_sqft: child_text(scope, "finishedSqFt"),
            bathrooms: child_text(scope, "bathrooms"),
            bedrooms: child_text(scope, "bedrooms"),
            last_sold_date: child_text(scope, "lastSoldDate"),
            last_sold_price: child_int(scope, "lastSoldPrice"),
            complete: true,
        }
    }
}

// ── Comparables ─────────────────────────────────────────────────────────────

/// Result of a comps operation: the subject property and its comparables.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompsResult {
    /// The property comparables were requested for.
    pub principal: Property,
    /// Comparable properties, in document order.
    pub comps: Vec<Property>,
    /// Comparable elements that could not be mapped, by position.
    pub rejects: Vec<CompReject>,
}

/// A comparable element that failed to map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompReject {
    /// Position of the element in the comparables collection.
    pub index: usize,
    pub reason: String,
}

/// Map a comparables collection node element by element.
///
/// The node is normalized to a sequence first, so a collection holding a
/// single comparable maps the same way as one holding many. A failing
/// element becomes a [`CompReject`] while the elements around it still
/// map.
pub fn map_comparables(node: &Value, detail: DetailLevel) -> (Vec<Property>, Vec<CompReject>) {
    let mut comps = Vec::new();
    let mut rejects = Vec::new();

    for (index, element) in as_list(node).into_iter().enumerate() {
        match Property::from_tree(element, detail) {
            Ok(comp) => comps.push(comp),
            Err(e) => {
                tracing::warn!("comparable at position {index} skipped: {e}");
                rejects.push(CompReject {
                    index,
                    reason: e.to_string(),
                });
            }
        }
    }

    (comps, rejects)
}

fn value_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn full_result() -> Value {
        json!({
            "zpid": "2100641621",
            "links": {
                "homedetails": "https://www.zillow.com/homedetails/2100641621_zpid/",
                "graphsanddata": "https://www.zillow.com/homedetails/2100641621_zpid/#charts-and-data",
                "mapthishome": "https://www.zillow.com/homes/2100641621_zpid/",
                "comparables": "https://www.zillow.com/homes/comps/2100641621_zpid/"
            },
            "address": {
                "street": "3400 Pacific Ave",
                "zipcode": "90292",
                "city": "Marina del Rey",
                "state": "CA",
                "latitude": "33.977006",
                "longitude": "-118.462543"
            },
            "zestimate": {
                "amount": {"@currency": "USD", "#text": "1723665"},
                "last-updated": "07/11/2018",
                "oneWeekChange": {"@deprecated": "true"},
                "valueChange": {"@duration": "30", "@currency": "USD", "#text": "-40884"},
                "valuationRange": {
                    "low": {"@currency": "USD", "#text": "1637482"},
                    "high": {"@currency": "USD", "#text": "1809848"}
                },
                "percentile": "0"
            },
            "localRealEstate": {
                "region": {
                    "@name": "Marina del Rey",
                    "@id": "46087",
                    "@type": "city",
                    "zindexValue": "1,772,100",
                    "links": {
                        "overview": "https://www.zillow.com/local-info/CA-Marina-del-Rey/r_46087/",
                        "forSaleByOwner": "https://www.zillow.com/marina-del-rey-ca/fsbo/",
                        "forSale": "https://www.zillow.com/marina-del-rey-ca/"
                    }
                }
            }
        })
    }

    #[test]
    fn test_map_full_result() {
        let place = Property::from_tree(&full_result(), DetailLevel::Standard).unwrap();

        assert_eq!(place.zpid.as_deref(), Some("2100641621"));
        assert_eq!(place.similarity_score, None);
        assert_eq!(place.zestimate.amount, Some(1723665));
        assert_eq!(place.zestimate.currency.as_deref(), Some("USD"));
        assert_eq!(place.zestimate.last_updated.as_deref(), Some("07/11/2018"));
        assert_eq!(place.zestimate.value_change_30day, Some(-40884));
        assert_eq!(place.zestimate.valuation_range_low, Some(1637482));
        assert_eq!(place.zestimate.valuation_range_high, Some(1809848));
        assert_eq!(place.address.street.as_deref(), Some("3400 Pacific Ave"));
        assert_eq!(place.address.latitude, Some(33.977006));
        assert_eq!(place.address.longitude, Some(-118.462543));
        assert_eq!(
            place.local_market.region_name.as_deref(),
            Some("Marina del Rey")
        );
        assert_eq!(place.local_market.region_id.as_deref(), Some("46087"));
        assert_eq!(
            place.local_market.home_value_index.as_deref(),
            Some("1,772,100")
        );
        assert!(place
            .local_market
            .fsbo_link
            .as_deref()
            .unwrap()
            .contains("fsbo"));
        assert!(place.links.home_details.is_some());
        assert!(place.links.graphs_and_data.is_some());
        // Standard detail leaves extended data untouched.
        assert!(!place.extended_details.complete);
        assert_eq!(place.extended_details, ExtendedDetails::default());
    }

    #[test]
    fn test_missing_sections_map_to_defaults() {
        let scope = json!({"zpid": "123"});
        let place = Property::from_tree(&scope, DetailLevel::Standard).unwrap();

        assert_eq!(place.zpid.as_deref(), Some("123"));
        assert_eq!(place.address, Address::default());
        assert_eq!(place.zestimate, Zestimate::default());
        assert_eq!(place.links, Links::default());
        assert_eq!(place.local_market, LocalMarket::default());
    }

    #[test]
    fn test_unparseable_amount_is_absent() {
        let scope = json!({
            "zpid": "123",
            "zestimate": {
                "amount": {"@currency": "USD", "#text": "N/A"},
                "last-updated": "01/01/2020"
            }
        });
        let place = Property::from_tree(&scope, DetailLevel::Standard).unwrap();

        assert_eq!(place.zestimate.amount, None);
        // Sibling fields are unaffected by the failed parse.
        assert_eq!(place.zestimate.currency.as_deref(), Some("USD"));
        assert_eq!(place.zestimate.last_updated.as_deref(), Some("01/01/2020"));
    }

    #[test]
    fn test_empty_amount_keeps_currency() {
        let scope = json!({
            "zestimate": {"amount": {"@currency": "USD"}}
        });
        let place = Property::from_tree(&scope, DetailLevel::Standard).unwrap();
        assert_eq!(place.zestimate.amount, None);
        assert_eq!(place.zestimate.currency.as_deref(), Some("USD"));
    }

    #[test]
    fn test_non_mapping_scope_fails() {
        let err = Property::from_tree(&json!(["a", "b"]), DetailLevel::Standard).unwrap_err();
        assert_eq!(err, MapError::NotAMapping("array"));

        let err = Property::from_tree(&json!("text"), DetailLevel::Standard).unwrap_err();
        assert_eq!(err, MapError::NotAMapping("string"));

        let err = Property::from_tree(&Value::Null, DetailLevel::Standard).unwrap_err();
        assert_eq!(err, MapError::NotAMapping("null"));
    }

    #[test]
    fn test_similarity_score_from_attribute() {
        let scope = json!({"@score": "0.156502", "zpid": "999"});
        let place = Property::from_tree(&scope, DetailLevel::Standard).unwrap();
        assert_eq!(place.similarity_score, Some(0.156502));

        let scope = json!({"@score": "not-a-number", "zpid": "999"});
        let place = Property::from_tree(&scope, DetailLevel::Standard).unwrap();
        assert_eq!(place.similarity_score, None);
    }

    #[test]
    fn test_extended_detail_populates_from_scope() {
        let scope = json!({
            "zpid": "48749425",
            "FIPScounty": "6037",
            "useCode": "Condominium",
            "taxAssessmentYear": "2017",
            "taxAssessment": "1387000.0",
            "yearBuilt": "1964",
            "lotSizeSqFt": "14478",
            "finishedSqFt": "1537",
            "bathrooms": "2.0",
            "bedrooms": "3",
            "lastSoldDate": "09/02/2008",
            "lastSoldPrice": {"@currency": "USD", "#text": "995000"}
        });

        let standard = Property::from_tree(&scope, DetailLevel::Standard).unwrap();
        assert!(!standard.extended_details.complete);
        assert_eq!(standard.extended_details.use_code, None);

        let extended = Property::from_tree(&scope, DetailLevel::Extended).unwrap();
        assert!(extended.extended_details.complete);
        assert_eq!(
            extended.extended_details.use_code.as_deref(),
            Some("Condominium")
        );
        assert_eq!(extended.extended_details.fips_county.as_deref(), Some("6037"));
        assert_eq!(extended.extended_details.last_sold_price, Some(995000));
        assert_eq!(
            extended.extended_details.last_sold_date.as_deref(),
            Some("09/02/2008")
        );
    }

    #[test]
    fn test_extended_complete_even_when_fields_missing() {
        let extended = Property::from_tree(&json!({"zpid": "1"}), DetailLevel::Extended).unwrap();
        assert!(extended.extended_details.complete);
        assert_eq!(extended.extended_details.use_code, None);
    }

    #[test]
    fn test_map_comparables_single_object() {
        let node = json!({"@score": "0.9", "zpid": "111"});
        let (comps, rejects) = map_comparables(&node, DetailLevel::Standard);
        assert_eq!(comps.len(), 1);
        assert!(rejects.is_empty());
        assert_eq!(comps[0].zpid.as_deref(), Some("111"));
        assert_eq!(comps[0].similarity_score, Some(0.9));
    }

    #[test]
    fn test_map_comparables_preserves_order() {
        let node = json!([
            {"@score": "0.3", "zpid": "1"},
            {"@score": "0.2", "zpid": "2"},
            {"@score": "0.1", "zpid": "3"}
        ]);
        let (comps, rejects) = map_comparables(&node, DetailLevel::Standard);
        assert!(rejects.is_empty());
        let zpids: Vec<_> = comps.iter().filter_map(|c| c.zpid.as_deref()).collect();
        assert_eq!(zpids, vec!["1", "2", "3"]);
    }

    #[test]
    fn test_map_comparables_rejects_by_position() {
        let node = json!([
            {"zpid": "1"},
            "not an element",
            {"zpid": "3"}
        ]);
        let (comps, rejects) = map_comparables(&node, DetailLevel::Standard);
        assert_eq!(comps.len(), 2);
        assert_eq!(rejects.len(), 1);
        assert_eq!(rejects[0].index, 1);
        assert!(rejects[0].reason.contains("string"));
        assert_eq!(comps[1].zpid.as_deref(), Some("3"));
    }

    #[test]
    fn test_to_value_snapshot_and_restore() {
        let place = Property::from_tree(&full_result(), DetailLevel::Standard).unwrap();
        let snapshot = place.to_value();

        assert_eq!(snapshot["zpid"], json!("2100641621"));
        assert_eq!(snapshot["zestimate"]["amount"], json!(1723665));
        assert_eq!(snapshot["zestimate"]["currency"], json!("USD"));
        // Absent fields appear as explicit nulls.
        assert_eq!(snapshot["similarity_score"], Value::Null);
        assert_eq!(snapshot["extended_details"]["use_code"], Value::Null);

        let restored: Property = serde_json::from_value(snapshot).unwrap();
        assert_eq!(restored, place);
    }
}
