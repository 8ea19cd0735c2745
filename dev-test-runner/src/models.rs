//! Sample record types exercised by the runner.
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use jsonier::{
    list_of, map_of, record_value, timestamp, Field, FieldValues, Primitive, Record,
    RecordType, Result, SchemaBuilder, TIMESTAMP,
};

#[derive(Debug, Clone, PartialEq)]
pub struct LineItem {
    pub sku: String,
    pub quantity: i64,
    pub unit_price: f64,
}

impl Record for LineItem {
    const NAME: &'static str = "LineItem";

    fn declare(s: &mut SchemaBuilder<'_>) -> Result<()> {
        s.field("sku", Field::new(Primitive::Str).required())?
            .field("quantity", Field::new(Primitive::Int).default(1))?
            .field("unit_price", Field::new(Primitive::Float).rename("unit-price").required())?;
        Ok(())
    }

    fn build(v: &mut FieldValues) -> Result<Self> {
        Ok(Self {
            sku: v.take("sku")?,
            quantity: v.take("quantity")?,
            unit_price: v.take("unit_price")?,
        })
    }

    fn flatten(&self, v: &mut FieldValues) {
        v.put("sku", self.sku.clone());
        v.put("quantity", self.quantity);
        v.put("unit_price", self.unit_price);
    }
}

record_value!(LineItem);

#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub id: String,
    pub placed: Option<DateTime<Utc>>,
    pub shipped: Option<DateTime<Utc>>,
    pub items: Vec<LineItem>,
    pub notes: IndexMap<String, Vec<String>>,
    pub gift: bool,
}

impl Record for Order {
    const NAME: &'static str = "Order";

    fn declare(s: &mut SchemaBuilder<'_>) -> Result<()> {
        s.field("id", Field::new(Primitive::Str).required().keep_empty())?
            .field("placed", Field::new(TIMESTAMP).required())?
            .field("shipped", Field::new(timestamp(Some(Primitive::Int))).allow_null())?
            .field("items", Field::new(list_of(RecordType::of::<LineItem>())))?
            .field("notes", Field::new(map_of(list_of(Primitive::Str))))?
            .field("gift", Field::new(Primitive::Bool))?;
        Ok(())
    }

    fn build(v: &mut FieldValues) -> Result<Self> {
        Ok(Self {
            id: v.take("id")?,
            placed: v.take("placed")?,
            shipped: v.take("shipped")?,
            items: v.take("items")?,
            notes: v.take("notes")?,
            gift: v.take("gift")?,
        })
    }

    fn flatten(&self, v: &mut FieldValues) {
        v.put("id", self.id.clone());
        v.put("placed", self.placed);
        v.put("shipped", self.shipped);
        v.put("items", self.items.clone());
        v.put("notes", self.notes.clone());
        v.put("gift", self.gift);
    }
}
