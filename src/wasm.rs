use crate::bounds::BoundingBox;
use crate::config::WithinOptions;
use crate::coordinates::Coordinates;
use crate::error::FindError;
use crate::points::PointSet;
use crate::validate::{self, LooseArg};
use js_sys::{Array, Float64Array, Object, Reflect, Uint32Array};
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen_rayon::init_thread_pool;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn init_threads(n: usize) -> js_sys::Promise {
    init_thread_pool(n)
}

#[wasm_bindgen(typescript_custom_section)]
const TS_METRICS: &'static str = r#"
export type DistanceMetricToken = "euclidean" | "spherical" | "spherical_radians" | "spherical_meter";
"#;

fn to_js(e: FindError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

// --- Point Set ---

/// WASM wrapper for an immutable, shaped set of 3D points.
#[wasm_bindgen(js_name = PointSet)]
pub struct PointSet3D {
    inner: PointSet,
}

#[wasm_bindgen(js_class = PointSet)]
impl PointSet3D {
    /// Creates a point set from flat `[x, y, z, ...]` coordinates. Without a
    /// shape the points form a one-dimensional channel.
    #[wasm_bindgen(constructor)]
    pub fn new(coords: Vec<f64>, shape: Option<Vec<u32>>) -> Result<PointSet3D, JsValue> {
        let shape = to_shape(shape).unwrap_or_else(|| vec![coords.len() / 3]);
        PointSet::new(coords, &shape).map(|inner| PointSet3D { inner }).map_err(to_js)
    }

    /// Uniformly distributed random points inside a box.
    pub fn random(
        count: usize,
        min_x: f64, min_y: f64, min_z: f64,
        max_x: f64, max_y: f64, max_z: f64,
        seed: u64,
    ) -> Result<PointSet3D, JsValue> {
        let bounds = BoundingBox::new([min_x, min_y, min_z], [max_x, max_y, max_z]);
        PointSet::random(count, &bounds, seed).map(|inner| PointSet3D { inner }).map_err(to_js)
    }

    #[wasm_bindgen(getter)]
    pub fn csize(&self) -> usize {
        self.inner.csize()
    }

    #[wasm_bindgen(getter)]
    pub fn shape(&self) -> Vec<u32> {
        self.inner.shape().dims().iter().map(|&d| d as u32).collect()
    }

    #[wasm_bindgen(getter)]
    pub fn coords(&self) -> Vec<f64> {
        self.inner.coords().to_vec()
    }

    pub fn get_point(&self, flat: usize) -> Option<Vec<f64>> {
        self.inner.point(flat).map(|p| p.to_vec())
    }

    pub fn to_flat(&self, multi: Vec<u32>) -> Result<usize, JsValue> {
        let multi: Vec<usize> = multi.into_iter().map(|i| i as usize).collect();
        self.inner.shape().to_flat(&multi).map_err(to_js)
    }

    pub fn to_multi(&self, flat: usize) -> Result<Vec<u32>, JsValue> {
        self.inner
            .shape()
            .to_multi(flat)
            .map(|m| m.into_iter().map(|i| i as u32).collect())
            .map_err(to_js)
    }

    pub fn equals(&self, other: &PointSet3D) -> bool {
        self.inner == other.inner
    }
}

// --- Coordinates ---

/// WASM wrapper for searchable reference points.
#[wasm_bindgen(js_name = Coordinates)]
pub struct Coordinates3D {
    inner: Coordinates,
}

#[wasm_bindgen(js_class = Coordinates)]
impl Coordinates3D {
    #[wasm_bindgen(constructor)]
    pub fn new(points: &PointSet3D) -> Coordinates3D {
        Coordinates3D {
            inner: Coordinates::new(points.inner.clone()),
        }
    }

    pub fn set_points(&mut self, points: &PointSet3D) {
        self.inner.set_points(points.inner.clone());
    }

    pub fn set_point(&mut self, index: usize, x: f64, y: f64, z: f64) -> Result<(), JsValue> {
        self.inner.set_point(index, [x, y, z]).map_err(to_js)
    }

    #[wasm_bindgen(getter)]
    pub fn csize(&self) -> usize {
        self.inner.csize()
    }

    #[wasm_bindgen(getter)]
    pub fn index_is_built(&self) -> bool {
        self.inner.index_is_built()
    }

    /// Returns `{ indices, distances, shape }`: `k` `Uint32Array`s of flat
    /// indices, a `Float64Array` of distances and the distance array's shape.
    #[wasm_bindgen(js_name = findNearest)]
    pub fn find_nearest(
        &self,
        query: JsValue,
        k: JsValue,
        metric: JsValue,
        query_shape: Option<Vec<u32>>,
    ) -> Result<JsValue, JsValue> {
        let shape = to_shape(query_shape);
        let query = validate::loose_query(&to_loose(&query), shape.as_deref()).map_err(to_js)?;
        let k = validate::loose_count(&to_loose(&k), self.inner.csize()).map_err(to_js)?;
        let metric = validate::loose_metric(&to_loose(&metric)).map_err(to_js)?;

        let result = self.inner.find_nearest(&query, k, metric).map_err(to_js)?;

        let indices = Array::new();
        for collection in result.indices() {
            indices.push(&Uint32Array::from(&to_u32(collection.flat())[..]));
        }
        let distances = result.distances();
        let shape: Vec<u32> = distances.shape().dims().iter().map(|&d| d as u32).collect();

        let out = Object::new();
        Reflect::set(&out, &"indices".into(), &indices)?;
        Reflect::set(&out, &"distances".into(), &Float64Array::from(distances.as_slice()))?;
        Reflect::set(&out, &"shape".into(), &Uint32Array::from(&shape[..]))?;
        Ok(out.into())
    }

    /// Returns one `Uint32Array` of flat indices per query point.
    #[wasm_bindgen(js_name = findWithin)]
    pub fn find_within(
        &self,
        query: JsValue,
        radius: JsValue,
        metric: JsValue,
        atol: JsValue,
        return_sorted: JsValue,
        query_shape: Option<Vec<u32>>,
    ) -> Result<Array, JsValue> {
        let shape = to_shape(query_shape);
        let query = validate::loose_query(&to_loose(&query), shape.as_deref()).map_err(to_js)?;
        let options = WithinOptions::new(validate::loose_radius(&to_loose(&radius)).map_err(to_js)?)
            .metric(validate::loose_metric(&to_loose(&metric)).map_err(to_js)?)
            .atol(validate::loose_tolerance(&to_loose(&atol)).map_err(to_js)?)
            .return_sorted(validate::loose_sort_flag(&to_loose(&return_sorted)).map_err(to_js)?);

        let result = self.inner.find_within(&query, &options).map_err(to_js)?;

        let out = Array::new();
        for found in result.iter() {
            out.push(&Uint32Array::from(&to_u32(found)[..]));
        }
        Ok(out)
    }
}

fn to_u32(indices: &[usize]) -> Vec<u32> {
    indices.iter().map(|&i| i as u32).collect()
}

/// Classifies a JS value into the shapes the argument checks understand.
fn to_loose(val: &JsValue) -> LooseArg {
    if val.is_undefined() || val.is_null() {
        LooseArg::Missing
    } else if let Some(v) = val.as_f64() {
        LooseArg::Number(v)
    } else if let Some(text) = val.as_string() {
        LooseArg::Text(text)
    } else if let Some(flag) = val.as_bool() {
        LooseArg::Bool(flag)
    } else if let Some(arr) = val.dyn_ref::<Float64Array>() {
        LooseArg::Floats(arr.to_vec())
    } else if let Some(arr) = val.dyn_ref::<Array>() {
        LooseArg::List(arr.iter().map(|item| to_loose(&item)).collect())
    } else {
        LooseArg::Other(format!("{val:?}"))
    }
}

fn to_shape(dims: Option<Vec<u32>>) -> Option<Vec<usize>> {
    dims.map(|dims| dims.into_iter().map(|d| d as usize).collect())
}
