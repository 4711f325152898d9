// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Opaque resource handles minted by a backend.
//!
//! Handles are small integers with no meaning outside the backend that issued them.
//! They are `Copy` and cheap to store inside pending draw state.

macro_rules! define_handle {
    ($(#[$attr:meta])* $name:ident) => {
        $(#[$attr])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub u16);

        impl $name {
            /// Returns the raw handle value.
            #[inline]
            pub const fn index(self) -> u16 {
                self.0
            }
        }
    };
}

define_handle!(
    /// A compiled graphics or compute program.
    ProgramId
);
define_handle!(
    /// An immutable vertex buffer.
    VertexBufferId
);
define_handle!(
    /// A vertex buffer whose contents the application may update between frames.
    DynamicVertexBufferId
);
define_handle!(
    /// An immutable index buffer.
    IndexBufferId
);
define_handle!(
    /// An index buffer whose contents the application may update between frames.
    DynamicIndexBufferId
);
define_handle!(
    /// A texture.
    TextureId
);
define_handle!(
    /// A set of render target attachments.
    FrameBufferId
);
define_handle!(
    /// A named shader uniform.
    UniformId
);
define_handle!(
    /// A buffer of pre-encoded draw commands for indirect submission.
    IndirectBufferId
);
define_handle!(
    /// A slot in the view table. Valid ids are `0..max_views`.
    ViewId
);
