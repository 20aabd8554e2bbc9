//
//  fixtures.rs
//  Retain
//
//  Created by hak (tharun)
//

use crate::model::*;
use crate::reach::helpers::*;

/// A small program with the support namespace installed.
///
/// `App.Program::Main` creates a widget, calls `Show` through a reference,
/// copies a list to an array, initializes a static array and does checked
/// arithmetic. `App.Button` overrides `Show` and carries attributes.
pub(crate) struct Fixture {
    pub program: Program,
    pub object: TypeId,
    pub void: TypeId,
    pub int32: TypeId,
    pub string: TypeId,
    pub enum_base: TypeId,
    pub nullable: TypeId,

    pub app: TypeId,
    pub main: MethodId,
    pub blob: FieldId,
    pub initialize_array: MethodId,

    pub widget: TypeId,
    pub clickable: TypeId,
    pub widget_ctor: MethodId,
    pub widget_cctor: MethodId,
    pub widget_show: MethodId,
    pub widget_layout: MethodId,
    pub widget_count: FieldId,
    pub title: PropertyId,
    pub title_getter: MethodId,
    pub title_setter: MethodId,
    pub clicked: EventId,
    pub clicked_add: MethodId,
    pub clicked_remove: MethodId,
    pub show_ref: MethodId,

    pub button: TypeId,
    pub button_show: MethodId,
    pub button_marker: AttributeId,
    pub button_hint: AttributeId,
    pub marker_attribute: TypeId,
    pub marker_label: FieldId,

    pub color: TypeId,
    pub list: TypeId,
    pub list_t: GenericParamId,
    pub to_array: MethodId,

    pub unbox_integer: MethodId,
    pub unbox_long: MethodId,
    pub unbox_to: MethodId,
    pub box_method: MethodId,
    pub checked_add: MethodId,
    pub checked_sub: MethodId,
    pub checked_mul: MethodId,
}

fn type_with_base(program: &mut Program, ns: &str, name: &str, base: TypeId) -> TypeId {
    let mut def = TypeDef::new(ns, name);
    def.base_type = Some(base);
    program.add_type(def)
}

fn static_method(program: &mut Program, owner: TypeId, name: &str, ret: TypeId, params: &[TypeId]) -> MethodId {
    let mut def = MethodDef::new(owner, name, ret);
    def.flags.is_static = true;
    let id = program.add_method(def);
    for (i, &ty) in params.iter().enumerate() {
        program.add_param(id, format!("arg{}", i), ty);
    }
    id
}

fn ctor(program: &mut Program, owner: TypeId, void: TypeId) -> MethodId {
    program.add_method(MethodDef::new(owner, ".ctor", void))
}

impl Fixture {
    pub fn new() -> Self {
        let mut p = Program::new();

        // System
        let object = p.add_type(TypeDef::new("System", "Object"));
        let void = type_with_base(&mut p, "System", "Void", object);
        let int32 = type_with_base(&mut p, "System", "Int32", object);
        let string = type_with_base(&mut p, "System", "String", object);
        let system_type = type_with_base(&mut p, "System", "Type", object);
        let array = type_with_base(&mut p, "System", "Array", object);
        let enum_base = type_with_base(&mut p, "System", "Enum", object);
        let attribute = type_with_base(&mut p, "System", "Attribute", object);
        let nullable = type_with_base(&mut p, "System", "Nullable`1", object);
        p.add_generic_param(GenericOwner::Type(nullable), "T");
        let runtime_helpers = type_with_base(
            &mut p,
            "System.Runtime.CompilerServices",
            "RuntimeHelpers",
            object,
        );
        let initialize_array =
            static_method(&mut p, runtime_helpers, "InitializeArray", void, &[array, int32]);

        // Support namespace
        let boxing = p.add_type(TypeDef::new(DEFAULT_NAMESPACE, BOXING));
        let unbox_integer = static_method(&mut p, boxing, "UnboxInteger", int32, &[object]);
        let unbox_long = static_method(&mut p, boxing, "UnboxLong", int32, &[object]);
        let unbox_to = static_method(&mut p, boxing, "UnboxTo", void, &[object, array]);
        let box_method = static_method(&mut p, boxing, "Box", object, &[int32]);
        let checked = p.add_type(TypeDef::new(DEFAULT_NAMESPACE, CHECKED));
        let checked_add = static_method(&mut p, checked, "Add", int32, &[int32, int32]);
        let checked_sub = static_method(&mut p, checked, "Sub", int32, &[int32, int32]);
        let checked_mul = static_method(&mut p, checked, "Mul", int32, &[int32, int32]);
        for name in [
            ATTRIBUTE,
            ATTRIBUTES,
            ANNOTATION_TYPE,
            TYPE_HELPER,
            GENERIC_INSTANCE_ANNOTATION,
            GENERIC_TYPE_PARAMETER_ANNOTATION,
            GENERIC_METHOD_PARAMETER_ANNOTATION,
        ] {
            p.add_type(TypeDef::new(DEFAULT_NAMESPACE, name));
        }

        // Generics
        let list = type_with_base(&mut p, "System.Collections.Generic", "List`1", object);
        let (list_t, list_t_ty) = p.add_generic_param(GenericOwner::Type(list), "T");
        let t_array = p.add_type_spec(TypeSpec::Array {
            element: list_t_ty,
            rank: 1,
        });
        let to_array = p.add_method(MethodDef::new(list, "ToArray", t_array));

        // Attributes
        let marker_attribute = type_with_base(&mut p, "App", "MarkerAttribute", attribute);
        let marker_ctor = ctor(&mut p, marker_attribute, void);
        p.add_param(marker_ctor, "kind", system_type);
        let marker_label = p.add_field(FieldDef::new(marker_attribute, "Label", string));
        let hint_attribute = {
            let mut def = TypeDef::new("App", "HintAttribute");
            def.base_type = Some(attribute);
            def.flags.compiler_only = true;
            p.add_type(def)
        };
        let hint_ctor = ctor(&mut p, hint_attribute, void);

        let color = type_with_base(&mut p, "App", "Color", enum_base);

        // Widget
        let clickable = {
            let mut def = TypeDef::new("App", "IClickable");
            def.flags.interface = true;
            def.flags.is_abstract = true;
            p.add_type(def)
        };
        let widget = {
            let mut def = TypeDef::new("App", "Widget");
            def.base_type = Some(object);
            def.interfaces.push(clickable);
            p.add_type(def)
        };
        let widget_ctor = ctor(&mut p, widget, void);
        let widget_cctor = {
            let mut def = MethodDef::new(widget, ".cctor", void);
            def.flags.is_static = true;
            def.visibility = Visibility::Private;
            p.add_method(def)
        };
        let widget_show = {
            let mut def = MethodDef::new(widget, "Show", void);
            def.flags.is_virtual = true;
            p.add_method(def)
        };
        let widget_layout = {
            let mut def = MethodDef::new(widget, "Layout", void);
            def.visibility = Visibility::Private;
            p.add_method(def)
        };
        let widget_count = {
            let mut def = FieldDef::new(widget, "count", int32);
            def.visibility = Visibility::Private;
            p.add_field(def)
        };
        let title_getter = p.add_method(MethodDef::new(widget, "get_Title", string));
        let title_setter = p.add_method(MethodDef::new(widget, "set_Title", void));
        p.add_param(title_setter, "value", string);
        let title = p.add_property(PropertyDef {
            declaring_type: widget,
            name: "Title".to_string(),
            property_type: string,
            parameters: vec![],
            getter: Some(title_getter),
            setter: Some(title_setter),
            attributes: vec![],
        });
        let clicked_add = p.add_method(MethodDef::new(widget, "add_Clicked", void));
        let clicked_remove = p.add_method(MethodDef::new(widget, "remove_Clicked", void));
        let clicked = p.add_event(EventDef {
            declaring_type: widget,
            name: "Clicked".to_string(),
            event_type: object,
            add: Some(clicked_add),
            remove: Some(clicked_remove),
            invoke: None,
            attributes: vec![],
        });
        let widget_ref = p.add_type_ref("App.Widget");
        let show_ref = p.add_method_ref(MethodRef {
            declaring_type: widget_ref,
            name: "Show".to_string(),
            return_type: void,
            parameter_types: vec![],
        });

        // Button
        let button = type_with_base(&mut p, "App", "Button", widget);
        let button_show = {
            let mut def = MethodDef::new(button, "Show", void);
            def.flags.is_virtual = true;
            p.add_method(def)
        };
        let mut marker = Attribute::new(marker_ctor);
        marker.arguments.push(AttributeValue {
            value_type: system_type,
            value: ArgumentValue::Type(color),
        });
        marker.fields.push(NamedArgument {
            name: "Label".to_string(),
            argument: AttributeValue {
                value_type: string,
                value: ArgumentValue::String("primary".to_string()),
            },
        });
        let button_marker = p.add_attribute(Entity::Type(button), marker);
        let button_hint = p.add_attribute(Entity::Type(button), Attribute::new(hint_ctor));

        // Program
        let app = {
            let mut def = TypeDef::new("App", "Program");
            def.base_type = Some(object);
            def.flags.is_abstract = true;
            def.flags.sealed = true;
            p.add_type(def)
        };
        let blob = {
            let mut def = FieldDef::new(app, "data", int32);
            def.is_static = true;
            def.visibility = Visibility::Private;
            p.add_field(def)
        };
        let main = {
            let mut def = MethodDef::new(app, "Main", void);
            def.flags.is_static = true;
            def.body = Some(MethodBody {
                locals: vec![widget],
                handlers: vec![],
                instructions: vec![
                    Instruction::new(OpCode::Newobj, Operand::Method(widget_ctor)),
                    Instruction::new(OpCode::Stloc, Operand::Local(0)),
                    Instruction::new(OpCode::Ldloc, Operand::Local(0)),
                    Instruction::new(OpCode::Callvirt, Operand::Method(show_ref)),
                    Instruction::new(OpCode::Callvirt, Operand::Method(to_array)),
                    Instruction::new(OpCode::Ldtoken, Operand::Field(blob)),
                    Instruction::new(OpCode::Call, Operand::Method(initialize_array)),
                    Instruction::simple(OpCode::AddOvf),
                    Instruction::simple(OpCode::Ret),
                ],
            });
            p.add_method(def)
        };
        p.add_entry_point(Entity::Method(main));

        let mut assembly_marker = Attribute::new(marker_ctor);
        assembly_marker.arguments.push(AttributeValue {
            value_type: system_type,
            value: ArgumentValue::Type(button),
        });
        p.add_program_attribute(assembly_marker);

        Self {
            program: p,
            object,
            void,
            int32,
            string,
            enum_base,
            nullable,
            app,
            main,
            blob,
            initialize_array,
            widget,
            clickable,
            widget_ctor,
            widget_cctor,
            widget_show,
            widget_layout,
            widget_count,
            title,
            title_getter,
            title_setter,
            clicked,
            clicked_add,
            clicked_remove,
            show_ref,
            button,
            button_show,
            button_marker,
            button_hint,
            marker_attribute,
            marker_label,
            color,
            list,
            list_t,
            to_array,
            unbox_integer,
            unbox_long,
            unbox_to,
            box_method,
            checked_add,
            checked_sub,
            checked_mul,
        }
    }

    /// Support type `name` in the default namespace.
    pub fn helper(&self, name: &str) -> TypeId {
        self.program
            .find_type(&format!("{}.{}", DEFAULT_NAMESPACE, name))
            .unwrap()
    }

    /// Every program entity, for whole-graph assertions.
    pub fn all_entities(&self) -> impl Iterator<Item = Entity> + '_ {
        let p = &self.program;
        (0..p.types.len())
            .map(|i| Entity::Type(TypeId::new(i)))
            .chain((0..p.methods.len()).map(|i| Entity::Method(MethodId::new(i))))
            .chain((0..p.fields.len()).map(|i| Entity::Field(FieldId::new(i))))
            .chain((0..p.properties.len()).map(|i| Entity::Property(PropertyId::new(i))))
            .chain((0..p.events.len()).map(|i| Entity::Event(EventId::new(i))))
            .chain((0..p.parameters.len()).map(|i| Entity::Parameter(ParamId::new(i))))
            .chain(
                (0..p.generic_parameters.len())
                    .map(|i| Entity::GenericParameter(GenericParamId::new(i))),
            )
            .chain((0..p.attributes.len()).map(|i| Entity::Attribute(AttributeId::new(i))))
    }
}
