//! Archivable types and delegates shared by the unit tests.

use crate::delegate::ArchiveDelegate;
use crate::object::Archivable;
use crate::traits::{Deserializer, DeserializerExt, Serializer, SerializerExt};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

impl Archivable for Size {
    fn class_name(&self) -> &str {
        "Size"
    }

    fn serialize(&self, out: &mut dyn Serializer) {
        out.set_float(self.width, "width");
        out.set_float(self.height, "height");
    }

    fn deserialize(&mut self, input: &mut dyn Deserializer) {
        if let Some(width) = found(input.get_float("width")) {
            self.width = width;
        }
        if let Some(height) = found(input.get_float("height")) {
            self.height = height;
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl Archivable for Point {
    fn class_name(&self) -> &str {
        "Point"
    }

    fn serialize(&self, out: &mut dyn Serializer) {
        out.set_float(self.x, "x");
        out.set_float(self.y, "y");
    }

    fn deserialize(&mut self, input: &mut dyn Deserializer) {
        if let Some(x) = found(input.get_float("x")) {
            self.x = x;
        }
        if let Some(y) = found(input.get_float("y")) {
            self.y = y;
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Rect {
    pub origin: Point,
    pub size: Size,
}

impl Rect {
    pub fn new(origin: Point, size: Size) -> Self {
        Self { origin, size }
    }
}

impl Archivable for Rect {
    fn class_name(&self) -> &str {
        "Rect"
    }

    fn serialize(&self, out: &mut dyn Serializer) {
        out.set_object(&self.origin, "origin");
        out.set_object(&self.size, "size");
    }

    fn deserialize(&mut self, input: &mut dyn Deserializer) {
        if let Some(origin) = input.get_object::<Point>("origin").into_value() {
            self.origin = origin;
        }
        if let Some(size) = input.get_object::<Size>("size").into_value() {
            self.size = size;
        }
    }
}

/// Object with an explicit class name and one field that is never archived.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Labelled {
    pub label: String,
    pub origin: String,
}

impl Labelled {
    pub fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
            origin: String::new(),
        }
    }
}

impl Archivable for Labelled {
    fn class_name(&self) -> &str {
        "app.Labelled"
    }

    fn serialize(&self, out: &mut dyn Serializer) {
        out.set_string(&self.label, "label");
    }

    fn deserialize(&mut self, input: &mut dyn Deserializer) {
        if let Some(label) = found(input.get_string("label")) {
            self.label = label;
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Scene {
    pub name: String,
    pub bounds: Rect,
    pub shapes: Vec<Rect>,
}

impl Archivable for Scene {
    fn class_name(&self) -> &str {
        "Scene"
    }

    fn serialize(&self, out: &mut dyn Serializer) {
        out.set_string(&self.name, "name");
        out.set_object(&self.bounds, "bounds");
        out.set_objects(&self.shapes, "shapes");
    }

    fn deserialize(&mut self, input: &mut dyn Deserializer) {
        if let Some(name) = found(input.get_string("name")) {
            self.name = name;
        }
        if let Some(bounds) = input.get_object::<Rect>("bounds").into_value() {
            self.bounds = bounds;
        }
        if let Some(shapes) = input.get_array::<Rect>("shapes").into_value() {
            self.shapes = shapes;
        }
    }
}

/// Singly linked list, archived one level of nesting per link.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Chain {
    pub link: i32,
    pub next: Option<Box<Chain>>,
}

impl Chain {
    pub fn with_depth(depth: i32) -> Self {
        (1..depth).fold(Chain::default(), |next, link| Chain {
            link,
            next: Some(Box::new(next)),
        })
    }

    pub fn depth(&self) -> i32 {
        let mut depth = 1;
        let mut current = self;
        while let Some(next) = &current.next {
            depth += 1;
            current = next;
        }
        depth
    }
}

impl Archivable for Chain {
    fn class_name(&self) -> &str {
        "Chain"
    }

    fn serialize(&self, out: &mut dyn Serializer) {
        out.set_int(self.link, "link");
        if let Some(next) = &self.next {
            out.set_object(&**next, "next");
        }
    }

    fn deserialize(&mut self, input: &mut dyn Deserializer) {
        if let Some(link) = found(input.get_int("link")) {
            self.link = link;
        }
        self.next = input.get_object::<Chain>("next").into_value().map(Box::new);
    }
}

fn found<T>(lookup: crate::result::Lookup<T>) -> Option<T> {
    lookup.is_found().then_some(lookup.value)
}

/// Logs every hook invocation as `"<hook> <class>"`.
#[derive(Debug, Default)]
pub struct Recorder {
    pub events: Vec<String>,
}

impl ArchiveDelegate for Recorder {
    fn pre_serialize_object(&mut self, object: &dyn Archivable) -> bool {
        self.events.push(format!("pre {}", object.class_name()));
        true
    }

    fn after_serialize_object(&mut self, object: &dyn Archivable) {
        self.events.push(format!("after {}", object.class_name()));
    }

    fn handle_instance(&mut self, candidate: Box<dyn Archivable>) -> Box<dyn Archivable> {
        self.events.push(format!("instance {}", candidate.class_name()));
        candidate
    }

    fn after_deserialize_object(&mut self, object: &mut dyn Archivable) -> bool {
        self.events.push(format!("filled {}", object.class_name()));
        true
    }
}

/// Refuses to write objects of one class.
pub struct SkipClass(pub &'static str);

impl ArchiveDelegate for SkipClass {
    fn pre_serialize_object(&mut self, object: &dyn Archivable) -> bool {
        object.class_name() != self.0
    }
}

/// Rejects read objects of one class.
pub struct RejectClass(pub &'static str);

impl ArchiveDelegate for RejectClass {
    fn after_deserialize_object(&mut self, object: &mut dyn Archivable) -> bool {
        object.class_name() != self.0
    }
}

/// Hands out its own `Labelled` instances.
pub struct Substitute;

impl ArchiveDelegate for Substitute {
    fn handle_instance(&mut self, candidate: Box<dyn Archivable>) -> Box<dyn Archivable> {
        if (*candidate).as_any().is::<Labelled>() {
            Box::new(Labelled {
                label: String::new(),
                origin: "substituted".into(),
            })
        } else {
            candidate
        }
    }
}

/// Replaces every instance with an unrelated type.
pub struct Impostor;

impl ArchiveDelegate for Impostor {
    fn handle_instance(&mut self, _candidate: Box<dyn Archivable>) -> Box<dyn Archivable> {
        Box::new(Size::default())
    }
}
