// src/crates/callsite-sema/src/type_display.rs
//
// Human-readable type names for diagnostics and call rendering.

use crate::compilation_db::CompilationDb;
use crate::type_arena::{SemaType, TypeId};

impl CompilationDb {
    /// Render a type the way a user would write it: `Wrapper<Mutable>`, `i32[,]`.
    pub fn display_type(&self, ty: TypeId) -> String {
        match self.types.get(ty) {
            SemaType::Invalid => "<invalid>".to_string(),
            SemaType::Void => "void".to_string(),
            SemaType::Primitive(p) => p.name().to_string(),
            SemaType::String => "string".to_string(),
            SemaType::Object => "object".to_string(),
            SemaType::Metatype => "Type".to_string(),
            SemaType::Nominal { def, args, .. } => {
                let name = &self.entities.get_type(*def).name;
                if args.is_empty() {
                    return name.clone();
                }
                let args: Vec<String> = args.iter().map(|&a| self.display_type(a)).collect();
                format!("{}<{}>", name, args.join(", "))
            }
            SemaType::Array { elem, rank } => {
                let commas = ",".repeat(usize::from(*rank).saturating_sub(1));
                format!("{}[{}]", self.display_type(*elem), commas)
            }
            SemaType::TypeParam(id) => self
                .entities
                .type_param(*id)
                .map(|tp| tp.name.clone())
                .unwrap_or_else(|| format!("T{}", id.index())),
            SemaType::ByRef(inner) => format!("ref {}", self.display_type(*inner)),
        }
    }

    /// `Declaring.Name` for diagnostics.
    pub fn display_method(&self, method: callsite_identity::MethodId) -> String {
        let def = self.method(method);
        format!("{}.{}", self.display_type(def.declaring_type), def.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity_defs::TypeDefKind;

    #[test]
    fn renders_closed_generics_and_arrays() {
        let mut db = CompilationDb::new();
        let mutable = db.define_type("Mutable", TypeDefKind::Struct, &[]);
        let wrapper = db.define_type("Wrapper", TypeDefKind::Class, &["T"]);
        let mutable_ty = db.self_type(mutable);
        let closed = db.closed_type(wrapper, &[mutable_ty]);
        let grid = db.array_type(TypeId::I32, 2);

        assert_eq!(db.display_type(closed), "Wrapper<Mutable>");
        assert_eq!(db.display_type(db.self_type(wrapper)), "Wrapper<T>");
        assert_eq!(db.display_type(grid), "i32[,]");
        assert_eq!(db.display_type(TypeId::OBJECT), "object");
    }
}
