//! Square texel grids.
//!
//! Every field of the simulation (forces, heights, normals, masks) is an
//! `N x N` grid addressed as `(x, z)`, with `x` running along the domain width
//! and `z` along its length. Storage is row-major in `z`.

/// Square grid of texels with clamp-to-edge neighbour addressing.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid<T> {
    size: usize,
    data: Vec<T>,
}

impl<T: Copy + Default> Grid<T> {
    /// Creates a `size x size` grid filled with `T::default()`.
    pub fn new(size: usize) -> Self {
        Self::filled(size, T::default())
    }

    pub fn filled(size: usize, value: T) -> Self {
        Self {
            size,
            data: vec![value; size * size],
        }
    }

    /// Builds a grid by evaluating `f(x, z)` for every texel.
    pub fn from_fn(size: usize, mut f: impl FnMut(usize, usize) -> T) -> Self {
        let mut data = Vec::with_capacity(size * size);
        for z in 0..size {
            for x in 0..size {
                data.push(f(x, z));
            }
        }
        Self { size, data }
    }

    /// Edge length of the grid.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn index(&self, x: usize, z: usize) -> usize {
        debug_assert!(x < self.size && z < self.size);
        z * self.size + x
    }

    #[inline]
    pub fn get(&self, x: usize, z: usize) -> T {
        self.data[self.index(x, z)]
    }

    #[inline]
    pub fn set(&mut self, x: usize, z: usize, value: T) {
        let i = self.index(x, z);
        self.data[i] = value;
    }

    #[inline]
    pub fn get_mut(&mut self, x: usize, z: usize) -> &mut T {
        let i = self.index(x, z);
        &mut self.data[i]
    }

    /// The four edge neighbours of `(x, z)` as `[-x, +x, -z, +z]`, clamped.
    #[inline]
    pub fn neighbours(&self, x: usize, z: usize) -> [T; 4] {
        let last = self.size - 1;
        [
            self.get(x.saturating_sub(1), z),
            self.get((x + 1).min(last), z),
            self.get(x, z.saturating_sub(1)),
            self.get(x, (z + 1).min(last)),
        ]
    }

    pub fn fill(&mut self, value: T) {
        self.data.fill(value);
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.data.iter()
    }

    /// Iterates over `((x, z), value)` pairs.
    pub fn indexed(&self) -> impl Iterator<Item = ((usize, usize), T)> + '_ {
        let size = self.size;
        self.data
            .iter()
            .enumerate()
            .map(move |(i, v)| ((i % size, i / size), *v))
    }

    /// Applies `f` to every texel, producing a grid of the same size.
    pub fn map<U: Copy + Default>(&self, f: impl Fn(T) -> U) -> Grid<U> {
        Grid {
            size: self.size,
            data: self.data.iter().map(|v| f(*v)).collect(),
        }
    }
}

impl Grid<f32> {
    /// Smallest and largest value in the grid, `(0, 0)` when empty.
    pub fn min_max(&self) -> (f32, f32) {
        if self.data.is_empty() {
            return (0.0, 0.0);
        }
        self.data
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            })
    }

    /// Largest absolute value in the grid.
    pub fn max_abs(&self) -> f32 {
        self.data.iter().fold(0.0f32, |m, v| m.max(v.abs()))
    }
}
